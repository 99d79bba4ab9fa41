//! Saved filter endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use ghim_core::{IssueFilter, SavedFilter};
use serde::Deserialize;

use super::error::{ApiError, ApiResult};
use super::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<SavedFilter>>> {
    Ok(Json(state.filters.list().await?))
}

#[derive(Debug, Deserialize)]
pub struct SaveFilterRequest {
    pub name: String,
    #[serde(default)]
    pub filter: IssueFilter,
}

pub async fn save(
    State(state): State<AppState>,
    Json(req): Json<SaveFilterRequest>,
) -> ApiResult<(StatusCode, Json<SavedFilter>)> {
    let saved = state.filters.save(&req.name, &req.filter).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Return the saved filter and mark it as used
pub async fn load(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<IssueFilter>> {
    state
        .filters
        .load(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Saved filter {} not found", id)))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    if state.filters.delete(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Saved filter {} not found", id)))
    }
}
