//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error not covered by a more specific variant
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// No Personal Access Token has been configured
    #[error("GitHub authentication is required to access repository issues. Please configure your GitHub Personal Access Token.")]
    Unauthenticated,

    /// HTTP 401
    #[error("{0}")]
    Unauthorized(String),

    /// HTTP 403
    #[error("{0}")]
    Forbidden(String),

    /// HTTP 404
    #[error("{0}")]
    NotFound(String),

    /// Issue number outside the range GitHub accepts
    #[error("Invalid issue number {0}: must be between 1 and {max}", max = i32::MAX)]
    InvalidIssueNumber(u64),

    /// Transport failure such as a refused connection or a timeout
    #[error("{0}")]
    Network(String),

    /// Rejected input
    #[error("{0}")]
    Validation(String),

    /// Invalid client configuration
    #[error("GitHub client configuration error: {0}")]
    Config(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map an HTTP status from GitHub to a specific error with user-facing text
    ///
    /// `target` names what was being accessed, e.g. `octo/demo`.
    pub fn from_status(status: u16, target: &str, message: &str) -> Self {
        match status {
            401 => Error::Unauthorized(
                "GitHub authentication failed. Please check your Personal Access Token and ensure it has the required 'repo' permissions."
                    .to_string(),
            ),
            403 => Error::Forbidden(
                "Access forbidden. Your GitHub token may not have permission to access this repository, or you may have exceeded the API rate limit."
                    .to_string(),
            ),
            404 => Error::NotFound(format!(
                "Repository '{}' not found. Please verify the repository name and that you have access to it.",
                target
            )),
            _ => Error::Other(format!("GitHub API error ({}): {}", status, message)),
        }
    }

    /// Issue-scoped 404
    pub fn issue_not_found(repo: &str, number: u64) -> Self {
        Error::NotFound(format!(
            "Issue #{} not found in {}. It may have been deleted or transferred.",
            number, repo
        ))
    }

    /// Convert an octocrab error, mapping well-known HTTP statuses
    pub fn from_octocrab(err: octocrab::Error, target: &str) -> Self {
        match err {
            octocrab::Error::GitHub { ref source, .. } => {
                let status = source.status_code.as_u16();
                match status {
                    401 | 403 | 404 => Error::from_status(status, target, &source.message),
                    _ => Error::Api(err),
                }
            }
            octocrab::Error::Serde { .. } | octocrab::Error::Json { .. } => {
                Error::Parse(format!("Failed to parse GitHub response: {}", root_cause(&err)))
            }
            octocrab::Error::Hyper { .. } | octocrab::Error::Service { .. } => {
                if timed_out(&err) {
                    Error::Network(
                        "Request to GitHub API timed out. Please try again later.".to_string(),
                    )
                } else {
                    Error::Network(format!(
                        "Unable to connect to GitHub API: {}",
                        root_cause(&err)
                    ))
                }
            }
            other => Error::Api(other),
        }
    }

    /// Like [`Error::from_octocrab`], but a 404 names the issue
    pub fn from_octocrab_issue(err: octocrab::Error, repo: &str, number: u64) -> Self {
        match Error::from_octocrab(err, repo) {
            Error::NotFound(_) => Error::issue_not_found(repo, number),
            other => other,
        }
    }
}

fn timed_out(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return true;
            }
        }
        current = e.source();
    }
    false
}

fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}
