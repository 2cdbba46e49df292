//! Issue lookups and issue search counts

use crate::{Error, GitHubClient, RepoRef, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const FIND_ISSUE_ID: &str = r#"
    query FindIssueId($owner: String!, $name: String!, $number: Int!) {
        repository(owner: $owner, name: $name) {
            issue(number: $number) {
                id
            }
        }
    }
"#;

const ISSUE_COUNT: &str = r#"
    query IssueCount($query: String!) {
        search(query: $query, type: ISSUE) {
            issueCount
        }
    }
"#;

#[derive(Debug, Serialize)]
struct FindIssueIdVariables<'a> {
    owner: &'a str,
    name: &'a str,
    number: u64,
}

#[derive(Debug, Deserialize)]
struct FindIssueIdData {
    repository: Option<IssueRepository>,
}

#[derive(Debug, Deserialize)]
struct IssueRepository {
    issue: Option<NodeId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeId {
    pub id: String,
}

#[derive(Debug, Serialize)]
struct IssueCountVariables<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct IssueCountData {
    search: IssueCountSearch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueCountSearch {
    issue_count: u64,
}

impl GitHubClient {
    /// Find the node id of issue `number` in `repo`
    pub async fn find_issue_id(&self, repo: &RepoRef, number: u64) -> Result<String> {
        debug!(%repo, number, "Finding issue id");

        let data: FindIssueIdData = self
            .execute(
                "FindIssueId",
                FIND_ISSUE_ID,
                &FindIssueIdVariables {
                    owner: &repo.owner,
                    name: &repo.name,
                    number,
                },
            )
            .await?;

        let repository = data
            .repository
            .ok_or_else(|| Error::NotFound(format!("Repository {}", repo)))?;

        repository
            .issue
            .map(|issue| issue.id)
            .ok_or_else(|| Error::NotFound(format!("Issue {}#{}", repo, number)))
    }

    /// Count issues and pull requests matching a GitHub search query
    ///
    /// The query uses GitHub's search syntax, e.g. `repo:owner/name is:open is:pr`.
    pub async fn search_issue_count(&self, query: &str) -> Result<u64> {
        debug!(query, "Counting issues and pull requests");

        let data: IssueCountData = self
            .execute("IssueCount", ISSUE_COUNT, &IssueCountVariables { query })
            .await?;

        info!(query, count = data.search.issue_count, "Search matched");

        Ok(data.search.issue_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_issue_id_variables() {
        let value = serde_json::to_value(FindIssueIdVariables {
            owner: "spring-io",
            name: "scorecard",
            number: 42,
        })
        .unwrap();
        assert_eq!(
            value,
            json!({ "owner": "spring-io", "name": "scorecard", "number": 42 })
        );
    }

    #[test]
    fn test_missing_issue_deserializes() {
        let data: FindIssueIdData =
            serde_json::from_value(json!({ "repository": { "issue": null } })).unwrap();
        assert!(data.repository.unwrap().issue.is_none());
    }

    #[test]
    fn test_issue_count_deserializes() {
        let data: IssueCountData =
            serde_json::from_value(json!({ "search": { "issueCount": 17 } })).unwrap();
        assert_eq!(data.search.issue_count, 17);
    }

    #[test]
    fn test_documents_name_their_operations() {
        assert!(FIND_ISSUE_ID.contains("query FindIssueId("));
        assert!(ISSUE_COUNT.contains("query IssueCount("));
    }
}
