//! Flat JSON files on local disk
//!
//! Watched repositories and saved filters are small lists that are rewritten
//! whole on every change. A missing file means "empty"; an unreadable one is
//! logged and treated as empty so the service still starts.

use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use crate::{Error, Result};

/// A JSON document stored at a fixed path
#[derive(Debug, Clone)]
pub struct JsonFile<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Read the document, failing on IO or parse errors
    pub fn try_load(&self) -> Result<T> {
        if !self.path.exists() {
            return Ok(T::default());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(T::default());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    /// Read the document, falling back to the default value on any error
    pub fn load(&self) -> T {
        match self.try_load() {
            Ok(value) => {
                debug!(path = %self.path.display(), "Loaded JSON store");
                value
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to load JSON store, starting empty");
                T::default()
            }
        }
    }

    /// Write the document, replacing the previous contents
    ///
    /// The new contents are written next to the target and renamed into
    /// place, so readers never observe a half-written file.
    pub fn save(&self, value: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(value)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            Error::Other(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!(path = %self.path.display(), "Saved JSON store");
        Ok(())
    }
}
