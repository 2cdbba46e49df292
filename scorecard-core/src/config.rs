//! Configuration management for Scorecard
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (SCORECARD_*)
//! 3. Config file (~/.config/scorecard/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{Error, Result};

/// GitHub's public GraphQL endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

const DEFAULT_USER_AGENT: &str = concat!("scorecard/", env!("CARGO_PKG_VERSION"));

/// GitHub API configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl GitHubConfig {
    /// Parsed endpoint URL
    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| Error::Config(format!("Invalid endpoint {}: {}", self.endpoint, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(Error::Config(format!(
                "Unsupported endpoint scheme '{}' in {}",
                scheme, self.endpoint
            ))),
        }
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// GitHub configuration
    pub github: GitHubConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    ///
    /// Values are not validated here; a later layer may still replace them.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading config file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/scorecard/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("scorecard").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - SCORECARD_GITHUB_ENDPOINT: GraphQL endpoint URL
    /// - SCORECARD_GITHUB_TIMEOUT: request timeout in seconds
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_env(
            std::env::var("SCORECARD_GITHUB_ENDPOINT").ok(),
            std::env::var("SCORECARD_GITHUB_TIMEOUT").ok(),
        )
    }

    fn apply_env(mut self, endpoint: Option<String>, timeout: Option<String>) -> Result<Self> {
        if let Some(endpoint) = endpoint {
            self.github.endpoint = endpoint;
        }

        if let Some(timeout) = timeout {
            self.github.timeout_secs = timeout.trim().parse().map_err(|_| {
                Error::Config(format!("SCORECARD_GITHUB_TIMEOUT is not a number: {}", timeout))
            })?;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, endpoint: Option<String>) -> Self {
        if let Some(endpoint) = endpoint {
            self.github.endpoint = endpoint;
        }

        self
    }

    /// Load configuration with all overrides applied, without validating it
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_layered(endpoint: Option<String>) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(endpoint))
    }

    /// Load configuration with all overrides applied, then validate the result
    pub fn load_with_overrides(endpoint: Option<String>) -> Result<Self> {
        let config = Self::load_layered(endpoint)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        self.github.endpoint_url()?;

        if self.github.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than 0".to_string()));
        }

        Ok(())
    }
}
