//! GitHub credential storage
//!
//! The Personal Access Token is kept apart from configuration in
//! `<data_dir>/auth.json`, which must have restrictive permissions (0600 on
//! Unix).
//!
//! Loading priority:
//! 1. Environment variable (GITHUB_TOKEN)
//! 2. Stored token (auth.json)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, Result};

/// File name of the stored token inside the data directory
pub const AUTH_FILE: &str = "auth.json";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
struct AuthData {
    token: Option<String>,
}

/// Stored GitHub Personal Access Token
#[derive(Clone)]
pub struct CredentialStore {
    path: PathBuf,
    token: Option<String>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("path", &self.path)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl CredentialStore {
    /// An empty store that will persist to `<data_dir>/auth.json`
    pub fn empty(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(AUTH_FILE),
            token: None,
        }
    }

    /// Open the store in `data_dir`
    ///
    /// A missing file yields an empty store.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(AUTH_FILE);
        if !path.exists() {
            return Ok(Self { path, token: None });
        }
        let token = Self::load_from_file(&path)?;
        Ok(Self { path, token })
    }

    /// Read a token file with permission checking
    fn load_from_file(path: &Path) -> Result<Option<String>> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            let mode = metadata.permissions().mode();

            // Readable by group or others
            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Credential file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Credential file permissions OK");
        }

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let data: AuthData = serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse credentials: {}", e)))?;

        Ok(data
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// GitHub token with environment variable override
    ///
    /// Priority: GITHUB_TOKEN env var > stored token
    pub fn token(&self) -> Option<String> {
        self.resolve(std::env::var("GITHUB_TOKEN").ok())
    }

    fn resolve(&self, env_token: Option<String>) -> Option<String> {
        if let Some(token) = env_token {
            let token = token.trim().to_string();
            if !token.is_empty() {
                debug!("Using GitHub token from GITHUB_TOKEN environment variable");
                return Some(token);
            }
        }

        if let Some(ref token) = self.token {
            debug!("Using stored GitHub token");
            return Some(token.clone());
        }

        None
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Store a new token and write it with owner-only permissions
    pub fn set(&mut self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::Validation("Token must not be empty".to_string()));
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }

        let data = AuthData {
            token: Some(token.to_string()),
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&data)?).map_err(Error::Io)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms).map_err(Error::Io)?;
        }

        self.token = Some(token.to_string());
        info!("GitHub token configured");
        Ok(())
    }

    /// Forget the stored token and delete the file
    pub fn clear(&mut self) -> Result<()> {
        self.token = None;
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(Error::Io)?;
        }
        info!("GitHub token cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::open(dir.path()).unwrap();
        assert!(store.resolve(None).is_none());
    }

    #[test]
    fn test_set_persists_trimmed_token() {
        let dir = TempDir::new().unwrap();
        let mut store = CredentialStore::open(dir.path()).unwrap();
        store.set("  ghp_xxxxxxxxxxxx \n").unwrap();

        let reopened = CredentialStore::open(dir.path()).unwrap();
        assert_eq!(reopened.resolve(None), Some("ghp_xxxxxxxxxxxx".to_string()));
    }

    #[test]
    fn test_empty_token_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = CredentialStore::open(dir.path()).unwrap();
        assert!(matches!(store.set("   "), Err(Error::Validation(_))));
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let mut store = CredentialStore::open(dir.path()).unwrap();
        store.set("ghp_test").unwrap();
        assert!(store.path().exists());

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.resolve(None).is_none());
    }

    #[test]
    fn test_env_var_takes_priority() {
        let dir = TempDir::new().unwrap();
        let mut store = CredentialStore::open(dir.path()).unwrap();
        store.set("from_file").unwrap();

        assert_eq!(
            store.resolve(Some("from_env".to_string())),
            Some("from_env".to_string())
        );
        assert_eq!(store.resolve(Some("  ".to_string())), Some("from_file".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_insecure_permissions_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(AUTH_FILE);
        std::fs::write(&path, r#"{"token": "test"}"#).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let result = CredentialStore::open(dir.path());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("insecure permissions"));
    }

    #[cfg(unix)]
    #[test]
    fn test_written_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let mut store = CredentialStore::open(dir.path()).unwrap();
        store.set("ghp_test").unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
