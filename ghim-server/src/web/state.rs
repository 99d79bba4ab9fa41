//! Shared application state

use std::sync::Arc;

use anyhow::Result;
use ghim_core::{
    Config, CredentialStore, JwtIssuer, SavedFilters, SavedFiltersHandle, Watchlist,
    WatchlistHandle,
};
use ghim_github::GitHubClient;
use tokio::sync::{Mutex, RwLock};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Effective configuration
    pub config: Arc<Config>,
    /// Issues and checks API tokens
    pub jwt: Arc<JwtIssuer>,
    /// GitHub client, rebuilt whenever the PAT changes
    pub github: Arc<RwLock<GitHubClient>>,
    /// Stored PAT
    pub credentials: Arc<Mutex<CredentialStore>>,
    /// Token of the most recent login, cleared on logout
    pub api_session: Arc<RwLock<Option<String>>>,
    pub watchlist: WatchlistHandle,
    pub filters: SavedFiltersHandle,
}

impl AppState {
    /// Open local stores, spawn their actors and build the GitHub client
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: Config) -> Result<Self> {
        let data_dir = config.storage.resolved_data_dir()?;

        let credentials = match CredentialStore::open(&data_dir) {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load stored GitHub token, starting unauthenticated");
                CredentialStore::empty(&data_dir)
            }
        };
        tracing::info!(
            data_dir = %data_dir.display(),
            github_authenticated = credentials.is_authenticated(),
            "Opened local stores"
        );

        let github = GitHubClient::from_config(credentials.token(), &config.github)?;
        let jwt = JwtIssuer::from_config(&config.jwt)?;

        Ok(Self {
            jwt: Arc::new(jwt),
            github: Arc::new(RwLock::new(github)),
            credentials: Arc::new(Mutex::new(credentials)),
            api_session: Arc::new(RwLock::new(None)),
            watchlist: Watchlist::open(&data_dir).spawn(),
            filters: SavedFilters::open(&data_dir).spawn(),
            config: Arc::new(config),
        })
    }

    /// Store a new PAT and rebuild the GitHub client with it
    pub async fn set_github_token(&self, token: &str) -> Result<()> {
        let mut credentials = self.credentials.lock().await;
        credentials.set(token)?;
        let client = GitHubClient::from_config(credentials.token(), &self.config.github)?;
        *self.github.write().await = client;
        Ok(())
    }

    /// Forget the PAT; the rebuilt client is unauthenticated unless GITHUB_TOKEN is set
    pub async fn clear_github_token(&self) -> Result<()> {
        let mut credentials = self.credentials.lock().await;
        credentials.clear()?;
        let client = GitHubClient::from_config(credentials.token(), &self.config.github)?;
        *self.github.write().await = client;
        Ok(())
    }

    pub async fn github_authenticated(&self) -> bool {
        self.github.read().await.is_authenticated()
    }

    /// Whether the last login's token is still present and valid
    pub async fn api_authenticated(&self) -> bool {
        match self.api_session.read().await.as_deref() {
            Some(token) => self.jwt.is_valid(token),
            None => false,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    pub const SECRET: &str = "0123456789abcdef0123456789abcdef";

    /// State rooted in a temporary data directory
    pub fn state(dir: &TempDir) -> AppState {
        let mut config = Config::default();
        config.storage.data_dir = Some(dir.path().to_path_buf());
        config.jwt.secret = Some(SECRET.to_string());
        AppState::new(config).unwrap()
    }
}
