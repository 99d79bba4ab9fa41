//! Configuration management for ghim
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (GHIM_*)
//! 3. Config file (~/.config/ghim/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 5080,
        }
    }
}

/// GitHub API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Base URL of the REST API
    pub api_url: String,

    /// Timeout for outbound requests
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Logins that count as automation agents when checking assignments
    pub agent_logins: Vec<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            timeout: Duration::from_secs(30),
            agent_logins: vec!["Copilot".to_string(), "copilot-swe-agent".to_string()],
        }
    }
}

/// API token configuration
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtConfig {
    /// HMAC signing secret; generated at start-up when unset
    pub secret: Option<String>,

    pub issuer: String,

    pub audience: String,

    /// Lifetime of issued tokens
    #[serde(with = "humantime_serde")]
    pub expiry: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            issuer: "ghim".to_string(),
            audience: "ghim-api".to_string(),
            expiry: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Local storage configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for auth.json, watched-repositories.json and saved-filters.json
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Configured data directory, or `~/.local/share/ghim` on Unix
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|p| p.join("ghim"))
                .ok_or_else(|| Error::Config("Could not determine data directory".to_string())),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub github: GitHubConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
}

/// Values that may be supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/ghim/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ghim").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - GHIM_BIND, GHIM_PORT: server address
    /// - GHIM_DATA_DIR: data directory
    /// - GHIM_JWT_SECRET: token signing secret
    /// - GHIM_GITHUB_API_URL: GitHub REST base URL
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(bind) = var("GHIM_BIND") {
            self.server.bind = bind;
        }

        if let Some(port) = var("GHIM_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid GHIM_PORT value: {}", port)))?;
        }

        if let Some(dir) = var("GHIM_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(secret) = var("GHIM_JWT_SECRET") {
            self.jwt.secret = Some(secret);
        }

        if let Some(url) = var("GHIM_GITHUB_API_URL") {
            self.github.api_url = url;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, cli: CliOverrides) -> Self {
        if let Some(bind) = cli.bind {
            self.server.bind = bind;
        }

        if let Some(port) = cli.port {
            self.server.port = port;
        }

        if let Some(dir) = cli.data_dir {
            self.storage.data_dir = Some(dir);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(config_path: Option<&Path>, cli: CliOverrides) -> Result<Self> {
        let base = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };
        Ok(base.with_env_overrides()?.with_cli_overrides(cli))
    }
}
