//! Repository lookups: node id and assignable users

use crate::graphql::PageInfo;
use crate::issues::NodeId;
use crate::{Error, GitHubClient, RepoRef, Result};
use futures::stream::{self, Stream, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const FIND_REPOSITORY_ID: &str = r#"
    query FindRepositoryId($owner: String!, $name: String!) {
        repository(owner: $owner, name: $name) {
            id
        }
    }
"#;

const ASSIGNABLE_USERS: &str = r#"
    query AssignableUsers($owner: String!, $name: String!, $first: Int!, $after: String) {
        repository(owner: $owner, name: $name) {
            assignableUsers(first: $first, after: $after) {
                nodes {
                    login
                }
                pageInfo {
                    hasNextPage
                    endCursor
                }
            }
        }
    }
"#;

const ASSIGNABLE_USERS_PAGE_SIZE: u32 = 100;

#[derive(Debug, Serialize)]
struct RepositoryVariables<'a> {
    owner: &'a str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct FindRepositoryIdData {
    repository: Option<NodeId>,
}

#[derive(Debug, Serialize)]
struct AssignableUsersVariables<'a> {
    owner: &'a str,
    name: &'a str,
    first: u32,
    after: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct AssignableUsersData {
    repository: Option<AssignableUsersRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignableUsersRepository {
    assignable_users: UserConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserConnection {
    #[serde(default)]
    nodes: Vec<Option<UserNode>>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct UserNode {
    login: String,
}

/// One page of logins plus the cursor of the next page
struct UserPage {
    logins: Vec<String>,
    next: Option<String>,
}

impl GitHubClient {
    /// Find the node id of a repository
    pub async fn find_repository_id(&self, repo: &RepoRef) -> Result<String> {
        debug!(%repo, "Finding repository id");

        let data: FindRepositoryIdData = self
            .execute(
                "FindRepositoryId",
                FIND_REPOSITORY_ID,
                &RepositoryVariables {
                    owner: &repo.owner,
                    name: &repo.name,
                },
            )
            .await?;

        data.repository
            .map(|r| r.id)
            .ok_or_else(|| Error::NotFound(format!("Repository {}", repo)))
    }

    /// Logins of every user that can be assigned to issues in `repo`
    pub async fn find_assignable_users(&self, repo: &RepoRef) -> Result<Vec<String>> {
        let logins: Vec<String> = self.assignable_users(repo).try_collect().await?;
        info!(%repo, count = logins.len(), "Fetched assignable users");
        Ok(logins)
    }

    /// Stream assignable user logins, fetching pages lazily
    pub fn assignable_users<'a>(
        &'a self,
        repo: &'a RepoRef,
    ) -> impl Stream<Item = Result<String>> + 'a {
        // `None` state means the last page has been fetched
        stream::try_unfold(Some(None), move |cursor: Option<Option<String>>| async move {
            let Some(after) = cursor else {
                return Ok(None);
            };

            let page = self.assignable_users_page(repo, after.as_deref()).await?;
            let next = match page.next {
                Some(cursor) if after.as_deref() == Some(cursor.as_str()) => {
                    warn!(%repo, %cursor, "Cursor did not advance, stopping pagination");
                    None
                }
                next => next.map(Some),
            };

            Ok::<_, Error>(Some((page.logins, next)))
        })
        .map_ok(|logins| stream::iter(logins.into_iter().map(Ok)))
        .try_flatten()
    }

    async fn assignable_users_page(&self, repo: &RepoRef, after: Option<&str>) -> Result<UserPage> {
        debug!(%repo, ?after, "Fetching assignable users page");

        let data: AssignableUsersData = self
            .execute(
                "AssignableUsers",
                ASSIGNABLE_USERS,
                &AssignableUsersVariables {
                    owner: &repo.owner,
                    name: &repo.name,
                    first: ASSIGNABLE_USERS_PAGE_SIZE,
                    after,
                },
            )
            .await?;

        let connection = data
            .repository
            .ok_or_else(|| Error::NotFound(format!("Repository {}", repo)))?
            .assignable_users;

        Ok(UserPage {
            logins: connection
                .nodes
                .into_iter()
                .flatten()
                .map(|user| user.login)
                .collect(),
            next: connection.page_info.next_cursor(),
        })
    }
}
