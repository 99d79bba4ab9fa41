//! Error responses for the REST API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error body: `{"message": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// An error on its way to the client
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Log the cause and hide it behind a generic message
    pub fn internal(context: &str, cause: impl std::fmt::Display) -> Self {
        tracing::error!(error = %cause, "{}", context);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, context)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                message: self.message,
            }),
        )
            .into_response()
    }
}

impl From<ghim_core::Error> for ApiError {
    fn from(err: ghim_core::Error) -> Self {
        use ghim_core::Error;
        match err {
            Error::Validation(msg) => ApiError::bad_request(msg),
            Error::Token(msg) => ApiError::unauthorized(msg),
            other => ApiError::internal("Internal server error", other),
        }
    }
}

impl From<ghim_github::Error> for ApiError {
    fn from(err: ghim_github::Error) -> Self {
        use ghim_github::Error;
        match err {
            Error::Unauthenticated | Error::Unauthorized(_) => ApiError::unauthorized(err.to_string()),
            Error::Forbidden(msg) => ApiError::new(StatusCode::FORBIDDEN, msg),
            Error::NotFound(msg) => ApiError::not_found(msg),
            Error::Network(msg) => {
                tracing::warn!(error = %msg, "GitHub unreachable");
                ApiError::new(StatusCode::BAD_GATEWAY, msg)
            }
            Error::InvalidIssueNumber(_) | Error::Validation(_) | Error::Parse(_) => {
                ApiError::bad_request(err.to_string())
            }
            other => ApiError::internal("GitHub request failed", other),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::internal("Internal server error", err)
    }
}

/// Handler result
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_status() {
        let err: ApiError = ghim_core::Error::Validation("bad".to_string()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "bad");

        let err: ApiError = ghim_core::Error::Config("secret detail".to_string()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("secret detail"));
    }

    #[test]
    fn test_github_errors_map_to_status() {
        let cases = [
            (ghim_github::Error::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ghim_github::Error::from_status(401, "o/r", ""), StatusCode::UNAUTHORIZED),
            (ghim_github::Error::from_status(403, "o/r", ""), StatusCode::FORBIDDEN),
            (ghim_github::Error::from_status(404, "o/r", ""), StatusCode::NOT_FOUND),
            (ghim_github::Error::InvalidIssueNumber(0), StatusCode::BAD_REQUEST),
            (ghim_github::Error::Network("refused".to_string()), StatusCode::BAD_GATEWAY),
            (ghim_github::Error::Other("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_timeout_text_reaches_client() {
        let err = ApiError::from(ghim_github::Error::Network(
            "Request to GitHub API timed out. Please try again later.".to_string(),
        ));
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert!(err.message.contains("timed out"));
    }
}
