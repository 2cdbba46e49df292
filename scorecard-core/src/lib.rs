//! Scorecard Core - configuration shared by the Scorecard crates
//!
//! Holds the GitHub endpoint settings and the token lookup used to
//! authenticate against GitHub's GraphQL API.

pub mod config;
pub mod error;
pub mod secrets;

pub use config::{Config, GitHubConfig, DEFAULT_ENDPOINT};
pub use error::{Error, Result};
pub use secrets::{GitHubSecrets, Secrets};
