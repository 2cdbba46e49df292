//! GitHub token lookup
//!
//! The only secret scorecard needs is the bearer token sent with every GraphQL
//! request. `GITHUB_TOKEN` wins; otherwise `[github] token` is read from
//! `~/.config/scorecard/secrets.toml`, which must be 0600 on Unix.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Environment variable consulted before the secrets file
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// GitHub configuration
    pub github: GitHubSecrets,
}

/// GitHub-related secrets
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    /// GitHub Personal Access Token
    pub token: Option<String>,
}

impl std::fmt::Debug for GitHubSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSecrets")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_secrets_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Read the token file at `path`, rejecting it if group or others can access it
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mode = std::fs::metadata(path)?.permissions().mode();

            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}, \
                     the GitHub token must be private: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Token file is private");
        }

        let contents = std::fs::read_to_string(path)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        if let Some(ref mut token) = secrets.github.token {
            *token = token.trim().to_string();
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/scorecard/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("scorecard").join("secrets.toml"))
    }

    /// Get GitHub token with environment variable override
    ///
    /// Priority: GITHUB_TOKEN env var > secrets file
    pub fn github_token(&self) -> Option<String> {
        self.resolve_token(std::env::var(TOKEN_ENV_VAR).ok())
    }

    fn resolve_token(&self, from_env: Option<String>) -> Option<String> {
        if let Some(token) = from_env {
            let token = token.trim().to_string();
            if !token.is_empty() {
                debug!("Using GitHub token from {} environment variable", TOKEN_ENV_VAR);
                return Some(token);
            }
        }

        match self.github.token.as_deref() {
            Some(token) if !token.is_empty() => {
                debug!("Using GitHub token from secrets file");
                Some(token.to_string())
            }
            _ => None,
        }
    }

    /// Create a template secrets file at the default location
    pub fn create_template() -> Result<PathBuf> {
        let path = Self::default_secrets_path()
            .ok_or_else(|| Error::Config("Could not determine secrets path".to_string()))?;
        Self::create_template_at(&path)?;
        Ok(path)
    }

    /// Create a template secrets file at `path`
    ///
    /// The file is created 0600 and an existing file is never overwritten.
    pub fn create_template_at(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => Error::Config(format!(
                "Secrets file already exists at {}",
                path.display()
            )),
            _ => Error::Io(e),
        })?;
        file.write_all(TEMPLATE.as_bytes())?;

        warn!(path = %path.display(), "Created secrets template, add a GitHub token before use");

        Ok(())
    }
}

const TEMPLATE: &str = r#"# Bearer token for the GitHub GraphQL API (GITHUB_TOKEN takes precedence).
# Needs pull request write access for create-pr and auto-merge.
# scorecard will not read this file unless it is chmod 600.

[github]
token = ""
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn with_file_token(token: &str) -> Secrets {
        Secrets {
            github: GitHubSecrets {
                token: Some(token.to_string()),
            },
        }
    }

    #[test]
    fn test_default_secrets() {
        let secrets = Secrets::default();
        assert!(secrets.github.token.is_none());
        assert_eq!(secrets.resolve_token(None), None);
    }

    #[test]
    fn test_parse_secrets() {
        let toml = r#"
[github]
token = "ghp_xxxxxxxxxxxx"
"#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(secrets.github.token, Some("ghp_xxxxxxxxxxxx".to_string()));
    }

    #[test]
    fn test_env_token_wins() {
        let secrets = with_file_token("from_file");
        assert_eq!(
            secrets.resolve_token(Some("  from_env \n".to_string())),
            Some("from_env".to_string())
        );
    }

    #[test]
    fn test_blank_env_token_falls_back_to_file() {
        let secrets = with_file_token("from_file");
        assert_eq!(
            secrets.resolve_token(Some("   ".to_string())),
            Some("from_file".to_string())
        );
    }

    #[test]
    fn test_empty_file_token_is_absent() {
        let secrets = with_file_token("");
        assert_eq!(secrets.resolve_token(None), None);
    }

    #[test]
    fn test_debug_redacts_token() {
        let secrets = with_file_token("ghp_secret");
        let printed = format!("{:?}", secrets);
        assert!(!printed.contains("ghp_secret"));
        assert!(printed.contains("redacted"));
    }

    #[cfg(unix)]
    #[test]
    fn test_insecure_permissions_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[github]\ntoken = \"test\"").unwrap();

        let perms = std::fs::Permissions::from_mode(0o644);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let result = Secrets::load_from_file(file.path());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("insecure permissions"));
    }

    #[cfg(unix)]
    #[test]
    fn test_secure_permissions_accepted_and_trimmed() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[github]\ntoken = \"  ghp_test  \"").unwrap();

        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let secrets = Secrets::load_from_file(file.path()).unwrap();
        assert_eq!(secrets.github.token, Some("ghp_test".to_string()));
    }

    #[test]
    fn test_create_template_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("secrets.toml");

        Secrets::create_template_at(&path).unwrap();
        assert!(path.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);

            // The template itself must load, with an empty token treated as absent
            let secrets = Secrets::load_from_file(&path).unwrap();
            assert_eq!(secrets.resolve_token(None), None);
        }

        let err = Secrets::create_template_at(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_template_holds_only_the_token() {
        let parsed: toml::Table = toml::from_str(TEMPLATE).unwrap();
        assert_eq!(parsed.len(), 1);

        let github = parsed["github"].as_table().unwrap();
        assert_eq!(github.keys().collect::<Vec<_>>(), vec!["token"]);
        assert_eq!(github["token"].as_str(), Some(""));
        assert!(TEMPLATE.contains(TOKEN_ENV_VAR));
    }
}
