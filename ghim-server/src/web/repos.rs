//! Repository and PAT endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use ghim_core::{Label, Milestone, Repository, User};
use serde::{Deserialize, Serialize};

use super::auth_api::MessageResponse;
use super::error::{ApiError, ApiResult};
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub token: String,
}

/// Store a GitHub Personal Access Token
pub async fn set_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if req.token.trim().is_empty() {
        return Err(ApiError::bad_request("Token is required"));
    }
    state
        .set_github_token(&req.token)
        .await
        .map_err(|e| ApiError::internal("Failed to store GitHub token", e))?;
    Ok(Json(MessageResponse {
        message: "GitHub token saved".to_string(),
    }))
}

pub async fn clear_token(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state
        .clear_github_token()
        .await
        .map_err(|e| ApiError::internal("Failed to clear GitHub token", e))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Repository>>> {
    let github = state.github.read().await;
    Ok(Json(github.list_repositories().await?))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub repositories: Vec<Repository>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let query = params.q.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::bad_request("Query parameter 'q' is required"));
    }
    let github = state.github.read().await;
    let repositories = github.search_repositories(&query).await?;
    Ok(Json(SearchResponse {
        query,
        repositories,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> ApiResult<Json<Repository>> {
    let github = state.github.read().await;
    Ok(Json(github.get_repository(&owner, &repo).await?))
}

pub async fn labels(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Label>>> {
    let github = state.github.read().await;
    Ok(Json(github.list_labels(&owner, &repo).await?))
}

pub async fn milestones(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Milestone>>> {
    let github = state.github.read().await;
    Ok(Json(github.list_milestones(&owner, &repo).await?))
}

pub async fn assignees(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> ApiResult<Json<Vec<User>>> {
    let github = state.github.read().await;
    Ok(Json(github.list_assignees(&owner, &repo).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::state::test_support;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_token_roundtrip() {
        let dir = TempDir::new().unwrap();
        let state = test_support::state(&dir);

        let err = set_token(State(state.clone()), Json(TokenRequest { token: "  ".into() }))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        set_token(State(state.clone()), Json(TokenRequest { token: "ghp_test".into() }))
            .await
            .unwrap();
        assert!(state.github_authenticated().await);
        assert!(state.credentials.lock().await.path().exists());

        let status = clear_token(State(state.clone())).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(!state.credentials.lock().await.path().exists());
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let dir = TempDir::new().unwrap();
        let state = test_support::state(&dir);

        let err = search(State(state), Query(SearchParams { q: " ".into() }))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
