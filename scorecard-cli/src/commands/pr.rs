//! Pull request commands

use clap::Subcommand;
use scorecard_github::{
    AutoMerge, CreatePullRequest, GitHubClient, MergeMethod, PullRequestState, RepoRef,
};

#[derive(Subcommand, Debug)]
pub enum PrCommand {
    /// Open a pull request and print its node id
    CreatePr {
        /// Repository (owner/repo format or GitHub URL)
        #[arg(short, long)]
        repo: RepoRef,

        /// Branch to merge into
        #[arg(long)]
        base: String,

        /// Branch holding the changes
        #[arg(long)]
        head: String,

        /// Pull request title
        #[arg(short, long)]
        title: String,

        /// Pull request body
        #[arg(short, long)]
        body: Option<String>,

        /// Open as draft
        #[arg(long)]
        draft: bool,

        /// Enable auto-merge after creating
        #[arg(long)]
        auto_merge: bool,
    },

    /// Find pull requests whose title contains the given text
    FindByTitle {
        /// Title text to search for
        title: String,

        /// Limit the search to one repository
        #[arg(short, long)]
        repo: Option<RepoRef>,
    },

    /// Enable auto-merge on a pull request
    AutoMerge {
        /// Pull request node id
        pull_request_id: String,

        /// Merge method (merge, squash, rebase); repository default if omitted
        #[arg(short, long)]
        method: Option<MergeMethod>,
    },
}

impl PrCommand {
    /// Execute the pull request command
    pub async fn execute(&self, client: &GitHubClient) -> anyhow::Result<()> {
        match self {
            PrCommand::CreatePr {
                repo,
                base,
                head,
                title,
                body,
                draft,
                auto_merge,
            } => {
                let repository_id = client.find_repository_id(repo).await?;
                let id = client
                    .create_pull_request(&CreatePullRequest {
                        repository_id,
                        base_ref_name: base.clone(),
                        head_ref_name: head.clone(),
                        title: title.clone(),
                        body: body.clone(),
                        draft: *draft,
                    })
                    .await?;
                println!("{}", id);

                if *auto_merge {
                    let merge = client.enable_pull_request_auto_merge(&id, None).await?;
                    print_auto_merge(&merge);
                }
            }
            PrCommand::FindByTitle { title, repo } => {
                let found = client.find_by_title(repo.as_ref(), title).await?;

                println!("{} match(es)", found.issue_count);
                for pr in &found.pull_requests {
                    let state = match pr.state {
                        PullRequestState::Open => "open",
                        PullRequestState::Closed => "closed",
                        PullRequestState::Merged => "merged",
                    };
                    println!("  #{} [{}] {} ({})", pr.number, state, pr.title, pr.url);
                }
            }
            PrCommand::AutoMerge {
                pull_request_id,
                method,
            } => {
                let merge = client
                    .enable_pull_request_auto_merge(pull_request_id, *method)
                    .await?;
                print_auto_merge(&merge);
            }
        }

        Ok(())
    }
}

fn print_auto_merge(merge: &AutoMerge) {
    match merge.enabled_at {
        Some(at) => println!("Auto-merge enabled at {}", at.to_rfc3339()),
        None => println!("Auto-merge requested"),
    }
}
