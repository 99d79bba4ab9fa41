//! Issue fetching and management

use ghim_core::{Issue, IssueState};
use octocrab::params;
use tracing::{debug, info, warn};

use crate::client::validate_issue_number;
use crate::{convert, Error, GitHubClient, Result};

fn to_octocrab_state(state: IssueState) -> octocrab::models::IssueState {
    match state {
        IssueState::Open => octocrab::models::IssueState::Open,
        IssueState::Closed => octocrab::models::IssueState::Closed,
    }
}

/// Whether any assignee of `issue` is one of `agent_logins` (case-insensitive)
pub fn assigned_to_agent(issue: &Issue, agent_logins: &[String]) -> bool {
    issue.assignees.iter().any(|assignee| {
        agent_logins
            .iter()
            .any(|agent| agent.eq_ignore_ascii_case(&assignee.login))
    })
}

impl GitHubClient {
    /// List every issue of a repository, open and closed, across all pages
    ///
    /// Requires a Personal Access Token.
    pub async fn list_issues(&self, owner: &str, repo: &str) -> Result<Vec<Issue>> {
        self.require_token()?;
        let full_name = format!("{}/{}", owner, repo);
        debug!(repo = %full_name, "Listing issues");

        let first = self
            .octocrab()
            .issues(owner, repo)
            .list()
            .state(params::State::All)
            .per_page(100)
            .send()
            .await
            .map_err(|e| Error::from_octocrab(e, &full_name))?;

        let issues = self
            .octocrab()
            .all_pages(first)
            .await
            .map_err(|e| Error::from_octocrab(e, &full_name))?;

        let result: Vec<Issue> = issues
            .into_iter()
            .map(|issue| convert::issue(issue, &full_name))
            .collect();

        info!(repo = %full_name, count = result.len(), "Fetched issues");
        Ok(result)
    }

    /// Fetch a single issue by number
    pub async fn get_issue(&self, owner: &str, repo: &str, number: u64) -> Result<Issue> {
        validate_issue_number(number)?;
        let full_name = format!("{}/{}", owner, repo);
        debug!(repo = %full_name, number, "Fetching issue");

        let issue = self
            .octocrab()
            .issues(owner, repo)
            .get(number)
            .await
            .map_err(|e| Error::from_octocrab_issue(e, &full_name, number))?;

        Ok(convert::issue(issue, &full_name))
    }

    /// Create a new issue
    pub async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
    ) -> Result<Issue> {
        self.require_token()?;
        if title.trim().is_empty() {
            return Err(Error::Validation("Issue title must not be empty".to_string()));
        }
        let full_name = format!("{}/{}", owner, repo);

        let issue = self
            .octocrab()
            .issues(owner, repo)
            .create(title)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::from_octocrab(e, &full_name))?;

        info!(repo = %full_name, number = issue.number, "Created issue");
        Ok(convert::issue(issue, &full_name))
    }

    /// Replace the title and body of an issue
    pub async fn update_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        title: &str,
        body: &str,
    ) -> Result<Issue> {
        validate_issue_number(number)?;
        self.require_token()?;
        let full_name = format!("{}/{}", owner, repo);

        let issue = self
            .octocrab()
            .issues(owner, repo)
            .update(number)
            .title(title)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::from_octocrab_issue(e, &full_name, number))?;

        info!(repo = %full_name, number, "Updated issue");
        Ok(convert::issue(issue, &full_name))
    }

    /// Replace the assignees of an issue
    pub async fn assign_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        assignees: &[String],
    ) -> Result<Issue> {
        validate_issue_number(number)?;
        self.require_token()?;
        let full_name = format!("{}/{}", owner, repo);

        let issue = self
            .octocrab()
            .issues(owner, repo)
            .update(number)
            .assignees(assignees)
            .send()
            .await
            .map_err(|e| Error::from_octocrab_issue(e, &full_name, number))?;

        info!(repo = %full_name, number, assignees = ?assignees, "Assigned issue");
        Ok(convert::issue(issue, &full_name))
    }

    /// Close or reopen an issue
    pub async fn set_issue_state(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        state: IssueState,
    ) -> Result<Issue> {
        validate_issue_number(number)?;
        self.require_token()?;
        let full_name = format!("{}/{}", owner, repo);

        let issue = self
            .octocrab()
            .issues(owner, repo)
            .update(number)
            .state(to_octocrab_state(state))
            .send()
            .await
            .map_err(|e| Error::from_octocrab_issue(e, &full_name, number))?;

        info!(repo = %full_name, number, state = %state, "Changed issue state");
        Ok(convert::issue(issue, &full_name))
    }

    /// Whether an automation agent is among the issue's assignees
    ///
    /// Never fails: errors are logged and reported as `false`.
    pub async fn has_agent_assignment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        agent_logins: &[String],
    ) -> bool {
        match self.get_issue(owner, repo, number).await {
            Ok(issue) => assigned_to_agent(&issue, agent_logins),
            Err(e) => {
                warn!(owner, repo, number, error = %e, "Could not check agent assignment");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::TestServer;
    use axum::{http::StatusCode, routing::patch, Json, Router};
    use chrono::Utc;
    use ghim_core::User;
    use serde_json::json;

    fn issue_with_assignees(logins: &[&str]) -> Issue {
        Issue {
            id: 1,
            number: 1,
            title: "Flaky test".to_string(),
            body: String::new(),
            state: IssueState::Open,
            html_url: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            closed_at: None,
            author: User::with_login("octocat"),
            assignees: logins.iter().map(|l| User::with_login(*l)).collect(),
            labels: vec![],
            milestone: None,
            comments: 0,
            is_pull_request: false,
            repository: Some("octo/demo".to_string()),
        }
    }

    #[test]
    fn test_assigned_to_agent_case_insensitive() {
        let agents = vec!["Copilot".to_string()];
        assert!(assigned_to_agent(&issue_with_assignees(&["alice", "copilot"]), &agents));
        assert!(!assigned_to_agent(&issue_with_assignees(&["alice"]), &agents));
        assert!(!assigned_to_agent(&issue_with_assignees(&[]), &agents));
        assert!(!assigned_to_agent(&issue_with_assignees(&["copilot"]), &[]));
    }

    #[tokio::test]
    async fn test_list_issues_requires_token() {
        let client = GitHubClient::new(None, Default::default()).unwrap();
        let result = client.list_issues("octo", "demo").await;
        assert!(matches!(result, Err(Error::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_invalid_number_rejected_before_request() {
        let client = GitHubClient::new(Some("ghp_test".to_string()), Default::default()).unwrap();
        assert!(matches!(
            client.update_issue("octo", "demo", 0, "t", "b").await,
            Err(Error::InvalidIssueNumber(0))
        ));
        assert!(matches!(
            client
                .set_issue_state("octo", "demo", u64::from(u32::MAX), IssueState::Closed)
                .await,
            Err(Error::InvalidIssueNumber(_))
        ));
        assert!(
            !client
                .has_agent_assignment("octo", "demo", 0, &["Copilot".to_string()])
                .await
        );
    }

    #[tokio::test]
    async fn test_missing_issue_named_in_error() {
        let server = TestServer::bind().await;
        let router = Router::new().route(
            "/repos/octo/demo/issues/999",
            patch(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "message": "Not Found",
                        "documentation_url": "https://docs.github.com/rest/issues/issues#update-an-issue"
                    })),
                )
            }),
        );
        let client = server.client(Some("ghp_test"));
        server.serve(router);

        let err = client
            .set_issue_state("octo", "demo", 999, IssueState::Closed)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        let msg = err.to_string();
        assert!(msg.starts_with("Issue #999 not found in octo/demo"), "{}", msg);
        assert!(!msg.contains("Repository"));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_network_error() {
        // Bind then drop to get a port nothing listens on
        let server = TestServer::bind().await;
        let client = server.client(Some("ghp_test"));
        drop(server);

        let err = client.get_issue("octo", "demo", 1).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)), "{:?}", err);
        assert!(err.to_string().starts_with("Unable to connect to GitHub API"));
    }
}
