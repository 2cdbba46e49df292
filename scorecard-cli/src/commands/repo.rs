//! Repository lookup commands

use clap::Subcommand;
use futures::{pin_mut, TryStreamExt};
use scorecard_github::{GitHubClient, RepoRef};

#[derive(Subcommand, Debug)]
pub enum RepoCommand {
    /// Print the node id of a repository
    RepoId {
        /// Repository (owner/repo format or GitHub URL)
        repo: RepoRef,
    },

    /// Print the node id of an issue
    IssueId {
        /// Repository (owner/repo format or GitHub URL)
        repo: RepoRef,

        /// Issue number
        number: u64,
    },

    /// List users that can be assigned to issues and pull requests
    #[command(visible_alias = "assignable-users")]
    Assignees {
        /// Repository (owner/repo format or GitHub URL)
        repo: RepoRef,
    },
}

impl RepoCommand {
    /// Execute the repository command
    pub async fn execute(&self, client: &GitHubClient) -> anyhow::Result<()> {
        match self {
            RepoCommand::RepoId { repo } => {
                println!("{}", client.find_repository_id(repo).await?);
            }
            RepoCommand::IssueId { repo, number } => {
                println!("{}", client.find_issue_id(repo, *number).await?);
            }
            RepoCommand::Assignees { repo } => {
                let users = client.assignable_users(repo);
                pin_mut!(users);

                let mut count = 0usize;
                while let Some(login) = users.try_next().await? {
                    println!("{}", login);
                    count += 1;
                }

                if count == 0 {
                    println!("No assignable users in {}.", repo);
                }
            }
        }

        Ok(())
    }
}
