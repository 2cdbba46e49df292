//! Error types for GitHub operations

use crate::GraphQlError;
use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure (connect, timeout, unreadable body)
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from the GraphQL endpoint
    #[error("GraphQL request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response carried a GraphQL error list
    #[error("{}", join_messages(.0))]
    GraphQl(Vec<GraphQlError>),

    /// Neither data nor errors in the response
    #[error("GraphQL response for {0} is missing data")]
    MissingData(&'static str),

    /// The requested object does not exist or is not visible to the token
    #[error("{0} not found")]
    NotFound(String),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Configuration or secrets could not be loaded
    #[error(transparent)]
    Config(#[from] scorecard_core::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Whether this error means the object could not be resolved,
    /// either locally or through a GraphQL `NOT_FOUND` error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::GraphQl(errors) => {
                !errors.is_empty()
                    && errors
                        .iter()
                        .all(|e| e.kind.as_deref() == Some("NOT_FOUND"))
            }
            _ => false,
        }
    }
}

fn join_messages(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
