//! Error types for ghim

use thiserror::Error;

/// Result type alias for ghim core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ghim core operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token issuance or validation error
    #[error("Token error: {0}")]
    Token(String),

    /// Invalid input supplied by a caller
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A background store task has stopped
    #[error("Store unavailable: {0}")]
    StoreClosed(&'static str),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error::Token(err.to_string())
    }
}
