//! GraphQL request/response plumbing shared by every operation

use crate::{Error, GitHubClient, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Body posted to the GraphQL endpoint
#[derive(Debug, Serialize)]
struct GraphQlRequest<'a, V> {
    query: &'a str,
    variables: &'a V,
    #[serde(rename = "operationName")]
    operation_name: &'a str,
}

/// GraphQL response wrapper
#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

impl<T> GraphQlResponse<T> {
    /// Any error in the list fails the call, even when partial data came back.
    fn into_result(self, operation: &'static str) -> Result<T> {
        match (self.data, self.errors) {
            (_, Some(errors)) if !errors.is_empty() => Err(Error::GraphQl(errors)),
            (Some(data), _) => Ok(data),
            (None, _) => Err(Error::MissingData(operation)),
        }
    }
}

/// A single entry of a GraphQL `errors` list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GraphQlError {
    pub message: String,
    /// GitHub's error classification, e.g. `NOT_FOUND` or `FORBIDDEN`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
}

/// Pagination cursor block of a connection
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// Cursor for the following page, if there is one to fetch
    pub fn next_cursor(self) -> Option<String> {
        if self.has_next_page {
            self.end_cursor
        } else {
            None
        }
    }
}

impl GitHubClient {
    /// Execute a GraphQL operation and return its `data` block
    pub(crate) async fn execute<V, T>(
        &self,
        operation_name: &'static str,
        query: &str,
        variables: &V,
    ) -> Result<T>
    where
        V: Serialize + std::fmt::Debug,
        T: DeserializeOwned,
    {
        debug!(operation = operation_name, ?variables, "Sending GraphQL request");

        let request = GraphQlRequest {
            query,
            variables,
            operation_name,
        };

        let response = self
            .http()
            .post(self.endpoint().clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".to_string());
            warn!(operation = operation_name, %status, "GraphQL request rejected");
            return Err(Error::Status { status, body });
        }

        let body = response.bytes().await?;
        let parsed: GraphQlResponse<T> = serde_json::from_slice(&body).map_err(|e| {
            Error::Parse(format!(
                "Failed to parse {} response: {}",
                operation_name, e
            ))
        })?;

        parsed.into_result(operation_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Repo {
        id: String,
    }

    fn parse(value: serde_json::Value) -> GraphQlResponse<Repo> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_shape() {
        let variables = json!({ "owner": "spring-io", "name": "scorecard" });
        let request = GraphQlRequest {
            query: "query FindRepositoryId { }",
            variables: &variables,
            operation_name: "FindRepositoryId",
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["operationName"], "FindRepositoryId");
        assert_eq!(value["variables"]["owner"], "spring-io");
        assert_eq!(value["query"], "query FindRepositoryId { }");
    }

    #[test]
    fn test_data_only() {
        let response = parse(json!({ "data": { "id": "R_1" } }));
        assert_eq!(
            response.into_result("Test").unwrap(),
            Repo {
                id: "R_1".to_string()
            }
        );
    }

    #[test]
    fn test_errors_win_over_partial_data() {
        let response = parse(json!({
            "data": { "id": "R_1" },
            "errors": [
                { "message": "one", "type": "FORBIDDEN", "path": ["repository", 0] },
                { "message": "two" }
            ]
        }));
        match response.into_result("Test") {
            Err(Error::GraphQl(errors)) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].kind.as_deref(), Some("FORBIDDEN"));
                assert_eq!(errors[0].path, vec![json!("repository"), json!(0)]);
                assert!(errors[1].kind.is_none());
            }
            other => panic!("expected GraphQl error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_error_list_is_ignored() {
        let response = parse(json!({ "data": { "id": "R_1" }, "errors": [] }));
        assert!(response.into_result("Test").is_ok());
    }

    #[test]
    fn test_null_data_without_errors() {
        let response = parse(json!({ "data": null }));
        assert!(matches!(
            response.into_result("Test"),
            Err(Error::MissingData("Test"))
        ));
    }

    #[test]
    fn test_next_cursor() {
        let more = PageInfo {
            has_next_page: true,
            end_cursor: Some("abc".to_string()),
        };
        assert_eq!(more.next_cursor(), Some("abc".to_string()));

        let last = PageInfo {
            has_next_page: false,
            end_cursor: Some("abc".to_string()),
        };
        assert_eq!(last.next_cursor(), None);

        let broken = PageInfo {
            has_next_page: true,
            end_cursor: None,
        };
        assert_eq!(broken.next_cursor(), None);
    }
}
