//! Pull request creation, title search and auto-merge

use crate::issues::NodeId;
use crate::{Error, GitHubClient, RepoRef, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const CREATE_PULL_REQUEST: &str = r#"
    mutation CreatePullRequest(
        $repositoryId: ID!,
        $baseRefName: String!,
        $headRefName: String!,
        $title: String!,
        $body: String,
        $draft: Boolean
    ) {
        createPullRequest(input: {
            repositoryId: $repositoryId,
            baseRefName: $baseRefName,
            headRefName: $headRefName,
            title: $title,
            body: $body,
            draft: $draft
        }) {
            pullRequest {
                id
            }
        }
    }
"#;

const FIND_PULL_REQUESTS_BY_TITLE: &str = r#"
    query FindPullRequestsByTitle($query: String!, $first: Int!) {
        search(query: $query, type: ISSUE, first: $first) {
            issueCount
            nodes {
                __typename
                ... on PullRequest {
                    id
                    number
                    title
                    url
                    state
                }
            }
        }
    }
"#;

const ENABLE_PULL_REQUEST_AUTO_MERGE: &str = r#"
    mutation EnablePullRequestAutoMerge($pullRequestId: ID!, $mergeMethod: PullRequestMergeMethod) {
        enablePullRequestAutoMerge(input: { pullRequestId: $pullRequestId, mergeMethod: $mergeMethod }) {
            pullRequest {
                id
                autoMergeRequest {
                    enabledAt
                    mergeMethod
                }
            }
        }
    }
"#;

/// GitHub caps search results at 100 per page
const TITLE_SEARCH_LIMIT: u32 = 100;

/// Input for [`GitHubClient::create_pull_request`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePullRequest {
    /// Node id of the repository, see [`GitHubClient::find_repository_id`]
    pub repository_id: String,
    /// Branch the changes are merged into
    pub base_ref_name: String,
    /// Branch holding the changes
    pub head_ref_name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub draft: bool,
}

/// Pull request state as reported by GitHub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestState {
    Open,
    Closed,
    Merged,
}

/// A pull request returned by a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    /// Node id
    pub id: String,
    pub number: u64,
    pub title: String,
    pub url: String,
    pub state: PullRequestState,
}

/// Result of [`GitHubClient::find_by_title`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TitleSearch {
    /// Total matches reported by GitHub, may exceed `pull_requests.len()`
    pub issue_count: u64,
    pub pull_requests: Vec<PullRequestSummary>,
}

/// How an auto-merged pull request is merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeMethod {
    Merge,
    Squash,
    Rebase,
}

impl std::str::FromStr for MergeMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "merge" => Ok(MergeMethod::Merge),
            "squash" => Ok(MergeMethod::Squash),
            "rebase" => Ok(MergeMethod::Rebase),
            other => Err(Error::Parse(format!("Unknown merge method: {}", other))),
        }
    }
}

/// Auto-merge state after enabling it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoMerge {
    pub pull_request_id: String,
    /// `None` when GitHub did not report an auto-merge request
    pub enabled_at: Option<DateTime<Utc>>,
    pub merge_method: Option<MergeMethod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePullRequestData {
    create_pull_request: Option<CreatedPullRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedPullRequest {
    pull_request: Option<NodeId>,
}

#[derive(Debug, Serialize)]
struct SearchVariables<'a> {
    query: &'a str,
    first: u32,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    search: SearchResults,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResults {
    issue_count: u64,
    #[serde(default)]
    nodes: Vec<Option<SearchNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum SearchNode {
    PullRequest(PullRequestSummary),
    #[serde(other)]
    Other,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AutoMergeVariables<'a> {
    pull_request_id: &'a str,
    merge_method: Option<MergeMethod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AutoMergeData {
    enable_pull_request_auto_merge: Option<AutoMergePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AutoMergePayload {
    pull_request: Option<AutoMergePullRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AutoMergePullRequest {
    id: String,
    auto_merge_request: Option<AutoMergeRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AutoMergeRequest {
    enabled_at: Option<DateTime<Utc>>,
    merge_method: Option<MergeMethod>,
}

/// Build the search string for pull requests whose title contains `title`
fn title_search_query(repo: Option<&RepoRef>, title: &str) -> Result<String> {
    // Quotes can't be escaped inside a GitHub search phrase
    let phrase = title.replace('"', " ");
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return Err(Error::Parse(format!("Title has nothing to search for: {:?}", title)));
    }

    let mut query = format!("\"{}\" in:title is:pr", phrase);
    if let Some(repo) = repo {
        query.push_str(&format!(" repo:{}", repo));
    }
    Ok(query)
}

impl GitHubClient {
    /// Open a pull request and return its node id
    pub async fn create_pull_request(&self, input: &CreatePullRequest) -> Result<String> {
        debug!(
            repository_id = %input.repository_id,
            base = %input.base_ref_name,
            head = %input.head_ref_name,
            "Creating pull request"
        );

        let data: CreatePullRequestData = self
            .execute("CreatePullRequest", CREATE_PULL_REQUEST, input)
            .await?;

        let id = data
            .create_pull_request
            .and_then(|payload| payload.pull_request)
            .map(|pr| pr.id)
            .ok_or(Error::MissingData("CreatePullRequest"))?;

        info!(id = %id, title = %input.title, "Created pull request");

        Ok(id)
    }

    /// Search pull requests whose title contains `title`
    ///
    /// When `repo` is given the search is limited to that repository.
    /// Only the first 100 matches are returned; `issue_count` is the full total.
    pub async fn find_by_title(&self, repo: Option<&RepoRef>, title: &str) -> Result<TitleSearch> {
        let query = title_search_query(repo, title)?;
        debug!(query = %query, "Searching pull requests by title");

        let data: SearchData = self
            .execute(
                "FindPullRequestsByTitle",
                FIND_PULL_REQUESTS_BY_TITLE,
                &SearchVariables {
                    query: &query,
                    first: TITLE_SEARCH_LIMIT,
                },
            )
            .await?;

        let pull_requests = data
            .search
            .nodes
            .into_iter()
            .flatten()
            .filter_map(|node| match node {
                SearchNode::PullRequest(pr) => Some(pr),
                SearchNode::Other => None,
            })
            .collect();

        Ok(TitleSearch {
            issue_count: data.search.issue_count,
            pull_requests,
        })
    }

    /// Enable auto-merge on a pull request
    ///
    /// `merge_method` of `None` lets GitHub pick the repository default.
    pub async fn enable_pull_request_auto_merge(
        &self,
        pull_request_id: &str,
        merge_method: Option<MergeMethod>,
    ) -> Result<AutoMerge> {
        debug!(pull_request_id, ?merge_method, "Enabling auto-merge");

        let data: AutoMergeData = self
            .execute(
                "EnablePullRequestAutoMerge",
                ENABLE_PULL_REQUEST_AUTO_MERGE,
                &AutoMergeVariables {
                    pull_request_id,
                    merge_method,
                },
            )
            .await?;

        let pr = data
            .enable_pull_request_auto_merge
            .and_then(|payload| payload.pull_request)
            .ok_or(Error::MissingData("EnablePullRequestAutoMerge"))?;

        let (enabled_at, merge_method) = match pr.auto_merge_request {
            Some(request) => (request.enabled_at, request.merge_method),
            None => (None, None),
        };

        info!(pull_request_id = %pr.id, ?enabled_at, "Auto-merge enabled");

        Ok(AutoMerge {
            pull_request_id: pr.id,
            enabled_at,
            merge_method,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_variables_omit_missing_body() {
        let input = CreatePullRequest {
            repository_id: "R_1".to_string(),
            base_ref_name: "main".to_string(),
            head_ref_name: "fix-5".to_string(),
            title: "Update org.springframework 5.2.0".to_string(),
            body: None,
            draft: false,
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(
            value,
            json!({
                "repositoryId": "R_1",
                "baseRefName": "main",
                "headRefName": "fix-5",
                "title": "Update org.springframework 5.2.0",
                "draft": false
            })
        );

        let with_body = CreatePullRequest {
            body: Some("details".to_string()),
            ..input
        };
        assert_eq!(serde_json::to_value(&with_body).unwrap()["body"], "details");
    }

    #[test]
    fn test_title_search_query() {
        assert_eq!(
            title_search_query(None, "Update org.springframework 5.2.0").unwrap(),
            "\"Update org.springframework 5.2.0\" in:title is:pr"
        );

        let repo = RepoRef::new("rwinch", "github-graphql-explore");
        assert_eq!(
            title_search_query(Some(&repo), "say \"hi\"").unwrap(),
            "\"say  hi\" in:title is:pr repo:rwinch/github-graphql-explore"
        );
    }

    #[test]
    fn test_title_search_query_rejects_blank_titles() {
        for title in ["", "   ", "\t\n", "\"\"", " \" \" "] {
            let result = title_search_query(None, title);
            assert!(matches!(result, Err(Error::Parse(_))), "title {:?}", title);
        }
    }

    #[test]
    fn test_search_nodes_skip_non_pull_requests() {
        let data: SearchData = serde_json::from_value(json!({
            "search": {
                "issueCount": 3,
                "nodes": [
                    {
                        "__typename": "PullRequest",
                        "id": "PR_1",
                        "number": 7,
                        "title": "Update org.springframework 5.2.0",
                        "url": "https://github.com/o/n/pull/7",
                        "state": "MERGED"
                    },
                    { "__typename": "Issue" },
                    null
                ]
            }
        }))
        .unwrap();

        assert_eq!(data.search.issue_count, 3);
        let prs: Vec<_> = data
            .search
            .nodes
            .into_iter()
            .flatten()
            .filter_map(|n| match n {
                SearchNode::PullRequest(pr) => Some(pr),
                SearchNode::Other => None,
            })
            .collect();
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].number, 7);
        assert_eq!(prs[0].state, PullRequestState::Merged);
    }

    #[test]
    fn test_merge_method() {
        assert_eq!("squash".parse::<MergeMethod>().unwrap(), MergeMethod::Squash);
        assert_eq!("REBASE".parse::<MergeMethod>().unwrap(), MergeMethod::Rebase);
        assert!("fast-forward".parse::<MergeMethod>().is_err());

        let value = serde_json::to_value(AutoMergeVariables {
            pull_request_id: "PR_1",
            merge_method: Some(MergeMethod::Merge),
        })
        .unwrap();
        assert_eq!(value, json!({ "pullRequestId": "PR_1", "mergeMethod": "MERGE" }));
    }

    #[test]
    fn test_auto_merge_request_deserializes() {
        let data: AutoMergeData = serde_json::from_value(json!({
            "enablePullRequestAutoMerge": {
                "pullRequest": {
                    "id": "PR_1",
                    "autoMergeRequest": {
                        "enabledAt": "2024-03-01T12:00:00Z",
                        "mergeMethod": "SQUASH"
                    }
                }
            }
        }))
        .unwrap();

        let pr = data.enable_pull_request_auto_merge.unwrap().pull_request.unwrap();
        let request = pr.auto_merge_request.unwrap();
        assert_eq!(
            request.enabled_at.unwrap().to_rfc3339(),
            "2024-03-01T12:00:00+00:00"
        );
        assert_eq!(request.merge_method, Some(MergeMethod::Squash));
    }
}
