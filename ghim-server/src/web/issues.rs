//! Issue endpoints: filtered listing, editing, export and bulk updates

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDateTime, Utc};
use ghim_core::export::generate_filename;
use ghim_core::{ExportFormat, FilterStats, Issue, IssueFilter};
use ghim_github::{bulk_update, BulkAction, BulkReport};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// Query parameters for `GET .../issues`
///
/// List-valued parameters are comma-separated.
#[derive(Debug, Default, Deserialize)]
pub struct IssueQuery {
    pub q: Option<String>,
    pub state: Option<String>,
    pub assignee: Option<String>,
    pub label: Option<String>,
    pub milestone: Option<String>,
    pub author: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl IssueQuery {
    pub fn into_filter(self) -> ghim_core::Result<IssueFilter> {
        let mut filter = IssueFilter {
            search_query: self.q.unwrap_or_default(),
            assignees: split_list(self.assignee),
            labels: split_list(self.label),
            milestone: non_blank(self.milestone),
            author: non_blank(self.author),
            ..Default::default()
        };
        if let Some(state) = non_blank(self.state) {
            filter.state = state.parse()?;
        }
        if let Some(sort) = non_blank(self.sort) {
            filter.sort_by = sort.parse()?;
        }
        if let Some(direction) = non_blank(self.direction) {
            filter.sort_direction = direction.parse()?;
        }
        Ok(filter)
    }
}

#[derive(Debug, Serialize)]
pub struct IssueListResponse {
    pub issues: Vec<Issue>,
    pub stats: FilterStats,
}

pub async fn list(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
    Query(query): Query<IssueQuery>,
) -> ApiResult<Json<IssueListResponse>> {
    let filter = query.into_filter()?;

    let all = state.github.read().await.list_issues(&owner, &repo).await?;
    let issues = filter.apply(&all);
    let stats = IssueFilter::stats(&all, &issues);

    tracing::debug!(owner = %owner, repo = %repo, total = all.len(), shown = issues.len(), "Filtered issues");
    Ok(Json(IssueListResponse { issues, stats }))
}

#[derive(Debug, Deserialize)]
pub struct CreateIssueRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

pub async fn create(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
    Json(req): Json<CreateIssueRequest>,
) -> ApiResult<(StatusCode, Json<Issue>)> {
    if req.title.trim().is_empty() {
        return Err(ApiError::bad_request("Title is required"));
    }
    let issue = state
        .github
        .read()
        .await
        .create_issue(&owner, &repo, &req.title, &req.body)
        .await?;
    Ok((StatusCode::CREATED, Json(issue)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateIssueRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

pub async fn update(
    State(state): State<AppState>,
    Path((owner, repo, number)): Path<(String, String, u64)>,
    Json(req): Json<UpdateIssueRequest>,
) -> ApiResult<Json<Issue>> {
    let issue = state
        .github
        .read()
        .await
        .update_issue(&owner, &repo, number, &req.title, &req.body)
        .await?;
    Ok(Json(issue))
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    #[serde(default)]
    pub assignees: Vec<String>,
}

pub async fn assign(
    State(state): State<AppState>,
    Path((owner, repo, number)): Path<(String, String, u64)>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Json<Issue>> {
    let issue = state
        .github
        .read()
        .await
        .assign_issue(&owner, &repo, number, &req.assignees)
        .await?;
    Ok(Json(issue))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAssignedResponse {
    pub number: u64,
    pub agent_assigned: bool,
}

pub async fn agent_assigned(
    State(state): State<AppState>,
    Path((owner, repo, number)): Path<(String, String, u64)>,
) -> Json<AgentAssignedResponse> {
    let github = state.github.read().await;
    let agent_assigned = github
        .has_agent_assignment(&owner, &repo, number, &github.settings().agent_logins)
        .await;
    Json(AgentAssignedResponse {
        number,
        agent_assigned,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub filter: IssueFilter,
}

/// A rendered export ready to be sent
#[derive(Debug)]
pub struct ExportDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Filter `issues` and render them
pub fn render_export(
    issues: &[Issue],
    repository: &str,
    request: &ExportRequest,
    now: NaiveDateTime,
) -> ghim_core::Result<ExportDocument> {
    let filtered = request.filter.apply(issues);
    Ok(ExportDocument {
        filename: generate_filename(repository, &request.filter, request.format, now),
        content_type: request.format.content_type(),
        body: request.format.render(&filtered, repository)?,
    })
}

pub async fn export(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
    Json(req): Json<ExportRequest>,
) -> ApiResult<Response> {
    let full_name = format!("{}/{}", owner, repo);
    let all = state.github.read().await.list_issues(&owner, &repo).await?;
    let document = render_export(&all, &full_name, &req, Utc::now().naive_utc())?;

    tracing::info!(repo = %full_name, filename = %document.filename, "Exported issues");
    Ok((
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.filename),
            ),
        ],
        document.body,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub action: String,
    #[serde(default)]
    pub numbers: Vec<u64>,
    pub assignees: Option<Vec<String>>,
}

impl BulkRequest {
    pub fn to_action(&self) -> Result<BulkAction, ApiError> {
        match self.action.trim().to_ascii_lowercase().as_str() {
            "close" => Ok(BulkAction::Close),
            "reopen" => Ok(BulkAction::Reopen),
            "assign" => self
                .assignees
                .clone()
                .map(BulkAction::Assign)
                .ok_or_else(|| ApiError::bad_request("Assign requires 'assignees'")),
            other => Err(ApiError::bad_request(format!(
                "Unknown bulk action '{}'. Expected close, reopen or assign",
                other
            ))),
        }
    }
}

pub async fn bulk(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
    Json(req): Json<BulkRequest>,
) -> ApiResult<Json<BulkReport>> {
    let action = req.to_action()?;
    if req.numbers.is_empty() {
        return Err(ApiError::bad_request("No issue numbers given"));
    }

    let github = state.github.read().await;
    let report = bulk_update(&*github, &owner, &repo, &req.numbers, &action).await;
    Ok(Json(report))
}
