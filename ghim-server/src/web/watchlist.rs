//! Watched repository endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use ghim_core::Repository;
use ghim_github::parse_repo_ref;
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};
use super::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Repository>>> {
    Ok(Json(state.watchlist.list().await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchRequest {
    pub full_name: String,
}

#[derive(Debug, Serialize)]
pub struct WatchResponse {
    pub added: bool,
    pub repository: Repository,
}

/// Look a repository up on GitHub and add it to the watch list
pub async fn add(
    State(state): State<AppState>,
    Json(req): Json<WatchRequest>,
) -> ApiResult<(StatusCode, Json<WatchResponse>)> {
    let repo_ref = parse_repo_ref(&req.full_name).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let repository = state
        .github
        .read()
        .await
        .get_repository(&repo_ref.owner, &repo_ref.name)
        .await?;

    let added = state.watchlist.add(repository.clone()).await?;
    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(WatchResponse { added, repository })))
}

#[derive(Debug, Serialize)]
pub struct WatchStatus {
    pub id: u64,
    pub watched: bool,
}

pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<WatchStatus>> {
    let watched = state.watchlist.contains(id).await?;
    Ok(Json(WatchStatus { id, watched }))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Repository>> {
    state
        .watchlist
        .remove(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Repository {} is not watched", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::state::test_support;
    use ghim_core::User;
    use tempfile::TempDir;

    fn repository(id: u64, full_name: &str) -> Repository {
        let (owner, name) = full_name.split_once('/').unwrap();
        Repository {
            id,
            name: name.to_string(),
            full_name: full_name.to_string(),
            description: String::new(),
            private: false,
            html_url: format!("https://github.com/{}", full_name),
            stargazers_count: 0,
            forks_count: 0,
            open_issues_count: 0,
            language: String::new(),
            owner: User::with_login(owner),
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_add_rejects_malformed_name() {
        let dir = TempDir::new().unwrap();
        let state = test_support::state(&dir);

        let err = add(
            State(state),
            Json(WatchRequest {
                full_name: "not-a-repo".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_and_remove() {
        let dir = TempDir::new().unwrap();
        let state = test_support::state(&dir);
        state.watchlist.add(repository(7, "octo/demo")).await.unwrap();

        let Json(watched) = list(State(state.clone())).await.unwrap();
        assert_eq!(watched.len(), 1);
        let Json(before) = status(State(state.clone()), Path(7)).await.unwrap();
        assert!(before.watched);

        let Json(removed) = remove(State(state.clone()), Path(7)).await.unwrap();
        assert_eq!(removed.full_name, "octo/demo");
        let Json(after) = status(State(state.clone()), Path(7)).await.unwrap();
        assert!(!after.watched);

        let err = remove(State(state), Path(7)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
