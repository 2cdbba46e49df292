//! Scorecard CLI - Command line access to GitHub's GraphQL API
//!
//! Thin front end over the predefined queries in `scorecard-github`.

mod commands;

use clap::{Parser, Subcommand};
use scorecard_core::{Config, Secrets};
use scorecard_github::GitHubClient;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{PrCommand, RepoCommand, SearchArgs};

/// Scorecard: predefined GitHub GraphQL queries and mutations
#[derive(Parser, Debug)]
#[command(name = "scorecard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// GraphQL endpoint (overrides config)
    #[arg(long, global = true, env = "SCORECARD_GITHUB_ENDPOINT")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    #[command(flatten)]
    Repo(RepoCommand),

    #[command(flatten)]
    Pr(PrCommand),

    /// Count issues and pull requests matching a search query
    Count(SearchArgs),

    /// Show current configuration
    Config,

    /// Write a secrets template to ~/.config/scorecard/secrets.toml
    InitSecrets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Validated in `connect`, so `config` can still show a broken setup
    let config = Config::load_layered(cli.endpoint.clone())?;

    if cli.verbose {
        tracing::info!(
            endpoint = %config.github.endpoint,
            timeout_secs = config.github.timeout_secs,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("scorecard {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Repo(args)) => {
            args.execute(&connect(&config)?).await?;
        }
        Some(Commands::Pr(args)) => {
            args.execute(&connect(&config)?).await?;
        }
        Some(Commands::Count(args)) => {
            args.execute(&connect(&config)?).await?;
        }
        Some(Commands::Config) => {
            println!("Scorecard Configuration");
            println!("=======================");
            println!();
            println!("GitHub Settings:");
            println!("  endpoint: {}", config.github.endpoint);
            println!("  user_agent: {}", config.github.user_agent);
            println!("  timeout_secs: {}", config.github.timeout_secs);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
            let token = Secrets::load()?.github_token();
            println!(
                "GitHub token: {}",
                if token.is_some() { "configured" } else { "missing" }
            );
        }
        Some(Commands::InitSecrets) => {
            let path = Secrets::create_template()?;
            println!("Created {}", path.display());
        }
        None => {
            println!("Scorecard - predefined GitHub GraphQL queries and mutations");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn connect(config: &Config) -> anyhow::Result<GitHubClient> {
    let secrets = Secrets::load()?;
    Ok(GitHubClient::from_config(config, &secrets)?)
}
