//! GitHub GraphQL client construction

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};
use reqwest::header::{self, HeaderMap, HeaderValue};
use scorecard_core::{Config, Secrets, DEFAULT_ENDPOINT};
use tracing::info;
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Client for GitHub's GraphQL API
///
/// Every request carries `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    endpoint: Url,
}

/// Builder for [`GitHubClient`]
#[derive(Default)]
pub struct GitHubClientBuilder {
    token: Option<String>,
    endpoint: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl GitHubClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// GraphQL endpoint, defaults to `https://api.github.com/graphql`
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<GitHubClient> {
        let token = self
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Auth("GitHub token is empty".to_string()))?;

        let endpoint = self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::Parse(format!("Invalid endpoint {}: {}", endpoint, e)))?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| Error::Auth("GitHub token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT))
            .default_headers(headers);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build()?;

        info!(endpoint = %endpoint, "Created GitHub GraphQL client");

        Ok(GitHubClient { http, endpoint })
    }
}

impl GitHubClient {
    pub fn builder() -> GitHubClientBuilder {
        GitHubClientBuilder::new()
    }

    /// Create a client from loaded configuration and secrets
    pub fn from_config(config: &Config, secrets: &Secrets) -> Result<Self> {
        config.validate()?;

        let token = secrets.github_token().ok_or_else(|| {
            Error::Auth(
                "GitHub token not found. Set GITHUB_TOKEN environment variable \
                 or add token to ~/.config/scorecard/secrets.toml"
                    .to_string(),
            )
        })?;

        Self::builder()
            .token(token)
            .endpoint(config.github.endpoint.clone())
            .user_agent(config.github.user_agent.clone())
            .timeout(config.github.timeout())
            .build()
    }

    /// Create a client from the default config and secrets locations
    pub fn from_env() -> Result<Self> {
        let config = Config::load()?.with_env_overrides()?;
        let secrets = Secrets::load()?;
        Self::from_config(&config, &secrets)
    }

    /// The GraphQL endpoint requests are sent to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

/// Repository coordinates: `owner/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoRef {
    type Err = Error;

    /// Supports formats:
    /// - owner/repo
    /// - https://github.com/owner/repo
    /// - git@github.com:owner/repo.git
    fn from_str(s: &str) -> Result<Self> {
        let (owner, name) = parse_github_url(s.trim())?;
        Ok(Self::new(owner, name))
    }
}

fn split_owner_name(path: &str) -> Option<(String, String)> {
    let path = path.trim_matches('/').trim_end_matches(".git");
    let mut parts = path.split('/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => {
            Some((owner.to_string(), name.to_string()))
        }
        _ => None,
    }
}

/// Parse a GitHub URL into owner and repo
fn parse_github_url(url: &str) -> Result<(String, String)> {
    let invalid = || Error::Parse(format!("Invalid repository format: {}. Expected owner/repo", url));

    if url.starts_with("https://") || url.starts_with("http://") {
        let parsed = Url::parse(url).map_err(|e| Error::Parse(e.to_string()))?;
        return split_owner_name(parsed.path())
            .ok_or_else(|| Error::Parse(format!("Invalid GitHub URL path: {}", parsed.path())));
    }

    if let Some(rest) = url.strip_prefix("git@") {
        return rest
            .split_once(':')
            .and_then(|(_, path)| split_owner_name(path))
            .ok_or_else(|| Error::Parse(format!("Invalid SSH URL: {}", url)));
    }

    if url.contains(':') || url.matches('/').count() != 1 {
        return Err(invalid());
    }

    split_owner_name(url).ok_or_else(invalid)
}
