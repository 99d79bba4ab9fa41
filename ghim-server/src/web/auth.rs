//! Authentication middleware for the web server
//!
//! Every protected route requires `Authorization: Bearer <jwt>`. The
//! validated claims are stored in the request extensions for handlers.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use ghim_core::auth::bearer_token;

use super::error::ApiError;
use super::state::AppState;

/// Reject requests without a valid API token
pub async fn require_jwt(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(header) = auth_header else {
        tracing::warn!(path = %request.uri().path(), "Missing Authorization header");
        return Err(ApiError::unauthorized("Authorization header is required"));
    };

    let Some(token) = bearer_token(header) else {
        tracing::warn!(path = %request.uri().path(), "Invalid Authorization header format");
        return Err(ApiError::unauthorized("Authorization header must be a Bearer token"));
    };

    match state.jwt.validate(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::warn!(path = %request.uri().path(), error = %e, "Rejected API token");
            Err(ApiError::unauthorized("Invalid or expired token"))
        }
    }
}
