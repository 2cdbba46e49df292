//! Search count command

use clap::Args;
use scorecard_github::GitHubClient;

/// Count issues and pull requests matching a GitHub search query
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// GitHub search query, e.g. "repo:owner/name is:pr is:open"
    pub query: String,
}

impl SearchArgs {
    pub async fn execute(&self, client: &GitHubClient) -> anyhow::Result<()> {
        let count = client.search_issue_count(&self.query).await?;
        println!("{}", count);
        Ok(())
    }
}
