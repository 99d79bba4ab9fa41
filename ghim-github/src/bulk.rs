//! Bulk issue operations
//!
//! Each issue is updated independently. A failure on one issue is logged
//! and recorded, and processing moves on to the next; nothing is rolled back.

use async_trait::async_trait;
use ghim_core::{Issue, IssueState};
use serde::Serialize;
use tracing::{info, warn};

use crate::client::validate_issue_number;
use crate::{GitHubClient, Result};

/// Per-issue mutations a bulk run needs
#[async_trait]
pub trait IssueUpdater: Send + Sync {
    async fn set_state(&self, owner: &str, repo: &str, number: u64, state: IssueState)
        -> Result<Issue>;

    async fn set_assignees(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        assignees: &[String],
    ) -> Result<Issue>;
}

#[async_trait]
impl IssueUpdater for GitHubClient {
    async fn set_state(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        state: IssueState,
    ) -> Result<Issue> {
        self.set_issue_state(owner, repo, number, state).await
    }

    async fn set_assignees(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        assignees: &[String],
    ) -> Result<Issue> {
        self.assign_issue(owner, repo, number, assignees).await
    }
}

/// What to do with every selected issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAction {
    Close,
    Reopen,
    /// Replace assignees with the given logins
    Assign(Vec<String>),
}

impl BulkAction {
    pub fn name(&self) -> &'static str {
        match self {
            BulkAction::Close => "close",
            BulkAction::Reopen => "reopen",
            BulkAction::Assign(_) => "assign",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailure {
    pub number: u64,
    pub error: String,
}

/// Outcome of a bulk run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReport {
    pub succeeded: Vec<u64>,
    pub failed: Vec<BulkFailure>,
}

/// Apply `action` to each issue number in order
pub async fn bulk_update<U: IssueUpdater + ?Sized>(
    updater: &U,
    owner: &str,
    repo: &str,
    numbers: &[u64],
    action: &BulkAction,
) -> BulkReport {
    let mut report = BulkReport::default();

    for &number in numbers {
        let result = match validate_issue_number(number) {
            Err(e) => Err(e),
            Ok(()) => match action {
                BulkAction::Close => updater
                    .set_state(owner, repo, number, IssueState::Closed)
                    .await
                    .map(|_| ()),
                BulkAction::Reopen => updater
                    .set_state(owner, repo, number, IssueState::Open)
                    .await
                    .map(|_| ()),
                BulkAction::Assign(assignees) => updater
                    .set_assignees(owner, repo, number, assignees)
                    .await
                    .map(|_| ()),
            },
        };

        match result {
            Ok(()) => report.succeeded.push(number),
            Err(e) => {
                warn!(owner, repo, number, action = action.name(), error = %e, "Bulk update failed for issue");
                report.failed.push(BulkFailure {
                    number,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        owner,
        repo,
        action = action.name(),
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "Bulk update complete"
    );

    report
}
