//! ghim GitHub - GitHub integration for the ghim issue manager
//!
//! This crate wraps the GitHub REST API: repository discovery, issue
//! listing and editing, repository metadata, and bulk issue updates.

pub mod bulk;
mod client;
mod convert;
mod error;
mod issues;
mod metadata;
mod repos;
#[cfg(test)]
mod test_server;

pub use bulk::{bulk_update, BulkAction, BulkFailure, BulkReport, IssueUpdater};
pub use client::{parse_repo_ref, validate_issue_number, GitHubClient, GitHubSettings, RepoRef};
pub use error::{Error, Result};
pub use issues::assigned_to_agent;
