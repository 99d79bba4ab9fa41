//! MCP placeholder endpoints: server status, capabilities and access checks

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use chrono::{DateTime, Utc};
use ghim_core::auth::bearer_token;
use serde::Serialize;

use super::state::AppState;

pub const MCP_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub server_status: &'static str,
    pub authentication_required: bool,
    pub github_authenticated: bool,
    pub api_authenticated: bool,
    pub timestamp: DateTime<Utc>,
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        server_status: "running",
        authentication_required: true,
        github_authenticated: state.github_authenticated().await,
        api_authenticated: state.api_authenticated().await,
        timestamp: Utc::now(),
    })
}

#[derive(Debug, Serialize)]
pub struct AuthenticationInfo {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub required: bool,
    pub schemes: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct CapabilitiesResponse {
    pub version: &'static str,
    pub capabilities: Vec<&'static str>,
    pub authentication: AuthenticationInfo,
}

pub async fn capabilities() -> Json<CapabilitiesResponse> {
    Json(CapabilitiesResponse {
        version: MCP_VERSION,
        capabilities: vec![
            "github_repository_management",
            "github_issue_management",
            "authentication_required",
            "jwt_token_support",
        ],
        authentication: AuthenticationInfo {
            kind: "JWT",
            required: true,
            schemes: vec!["Bearer"],
        },
    })
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub valid: bool,
    pub message: &'static str,
}

/// Check the token in the `Authorization` header
pub async fn validate_access(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<AccessResponse> {
    let valid = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .is_some_and(|token| state.jwt.is_valid(token));

    Json(AccessResponse {
        valid,
        message: if valid {
            "Access granted"
        } else {
            "Access denied - invalid or missing token"
        },
    })
}
