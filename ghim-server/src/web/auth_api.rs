//! API token endpoints: login, validate, logout, me

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use ghim_core::Claims;
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};
use super::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires: DateTime<Utc>,
    pub user: LoginUser,
}

/// Issue an API token and make it the current session
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if req.user_id.trim().is_empty() || req.email.trim().is_empty() {
        return Err(ApiError::bad_request("UserId and Email are required"));
    }

    let roles = req.roles.unwrap_or_default();
    let issued = state.jwt.issue(&req.user_id, &req.email, &roles)?;
    *state.api_session.write().await = Some(issued.token.clone());

    Ok(Json(LoginResponse {
        token: issued.token,
        expires: issued.expires_at,
        user: LoginUser {
            id: req.user_id,
            email: req.email,
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
}

pub async fn validate(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> ApiResult<Json<ValidateResponse>> {
    if req.token.trim().is_empty() {
        return Err(ApiError::bad_request("Token is required"));
    }
    Ok(Json(ValidateResponse {
        valid: state.jwt.is_valid(req.token.trim()),
    }))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Revoke the presented token and end the current session
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Json<MessageResponse> {
    state.jwt.revoke(&claims.jti);
    *state.api_session.write().await = None;
    tracing::info!(user_id = %claims.sub, "Logged out");

    Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub roles: Vec<String>,
    pub is_authenticated: bool,
}

pub async fn me(Extension(claims): Extension<Claims>) -> Json<CurrentUser> {
    Json(CurrentUser {
        id: claims.sub,
        email: claims.email,
        roles: claims.roles,
        is_authenticated: true,
    })
}
