//! Scorecard GitHub - a thin client for GitHub's GraphQL API
//!
//! Every operation sends one predefined query or mutation, checks the
//! response for GraphQL errors and extracts the field it cares about.

mod client;
mod error;
mod graphql;
mod issues;
mod pr;
mod repository;

pub use client::{GitHubClient, GitHubClientBuilder, RepoRef};
pub use error::{Error, Result};
pub use graphql::GraphQlError;
pub use pr::{
    AutoMerge, CreatePullRequest, MergeMethod, PullRequestState, PullRequestSummary, TitleSearch,
};
