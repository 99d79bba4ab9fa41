//! GitHub API client using octocrab

use std::time::Duration;

use ghim_core::config::GitHubConfig;
use octocrab::Octocrab;
use tracing::info;

use crate::{Error, Result};

/// Connection settings for the GitHub API
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub api_url: String,
    pub timeout: Duration,
    /// Logins that count as automation agents
    pub agent_logins: Vec<String>,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self::from(&GitHubConfig::default())
    }
}

impl From<&GitHubConfig> for GitHubSettings {
    fn from(config: &GitHubConfig) -> Self {
        Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            agent_logins: config.agent_logins.clone(),
        }
    }
}

/// An `owner/name` repository reference
#[derive(Debug, Clone, PartialEq, Eq)]
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

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl std::str::FromStr for RepoRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_repo_ref(s)
    }
}

/// GitHub API client shared by every repository operation
///
/// The client may be built without a token; operations that need one fail
/// with [`Error::Unauthenticated`].
pub struct GitHubClient {
    client: Octocrab,
    token: Option<String>,
    settings: GitHubSettings,
}

impl GitHubClient {
    /// Create a new client, optionally authenticated with a Personal Access Token
    pub fn new(token: Option<String>, settings: GitHubSettings) -> Result<Self> {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let mut builder = Octocrab::builder();
        if let Some(ref token) = token {
            builder = builder.personal_token(token.clone());
        }
        let client = builder
            .base_uri(settings.api_url.as_str())
            .map_err(|e| Error::Config(format!("Invalid GitHub API URL {}: {}", settings.api_url, e)))?
            .set_connect_timeout(Some(settings.timeout))
            .set_read_timeout(Some(settings.timeout))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create GitHub client: {}", e)))?;

        info!(
            api_url = %settings.api_url,
            authenticated = token.is_some(),
            "Created GitHub client"
        );

        Ok(Self {
            client,
            token,
            settings,
        })
    }

    /// Build a client from the `[github]` config section
    pub fn from_config(token: Option<String>, config: &GitHubConfig) -> Result<Self> {
        Self::new(token, GitHubSettings::from(config))
    }

    /// Whether a Personal Access Token is configured
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Settings the client was built with
    pub fn settings(&self) -> &GitHubSettings {
        &self.settings
    }

    /// Get the underlying octocrab client
    pub fn octocrab(&self) -> &Octocrab {
        &self.client
    }

    pub(crate) fn require_token(&self) -> Result<()> {
        if self.token.is_none() {
            return Err(Error::Unauthenticated);
        }
        Ok(())
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.settings.api_url)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

/// Reject issue numbers GitHub can never hold
///
/// Valid numbers are `1..=i32::MAX`.
pub fn validate_issue_number(number: u64) -> Result<()> {
    if number == 0 || number > i32::MAX as u64 {
        return Err(Error::InvalidIssueNumber(number));
    }
    Ok(())
}

/// Parse a repository reference
///
/// Supports formats:
/// - owner/repo
/// - https://github.com/owner/repo
/// - git@github.com:owner/repo.git
pub fn parse_repo_ref(input: &str) -> Result<RepoRef> {
    let input = input.trim();
    let invalid = || {
        Error::Parse(format!(
            "Invalid repository format: {}. Expected owner/repo",
            input
        ))
    };

    let path = if input.starts_with("https://") || input.starts_with("http://") {
        let url = url::Url::parse(input).map_err(|e| Error::Parse(e.to_string()))?;
        url.path().trim_matches('/').to_string()
    } else if let Some(rest) = input.strip_prefix("git@") {
        rest.split_once(':')
            .map(|(_, path)| path.to_string())
            .ok_or_else(invalid)?
    } else if !input.contains(':') {
        input.to_string()
    } else {
        return Err(invalid());
    };

    let mut parts = path.trim_end_matches(".git").split('/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => {
            // Only URLs may carry trailing path segments (e.g. /issues)
            if parts.next().is_some() && !input.contains("://") {
                return Err(invalid());
            }
            Ok(RepoRef::new(owner, name))
        }
        _ => Err(invalid()),
    }
}
