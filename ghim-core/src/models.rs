//! GitHub resource snapshots
//!
//! These are flat copies of what the GitHub REST API returns. They are
//! rebuilt on every request and never written back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Issue state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A GitHub account (user, organization or bot)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
    /// Account type as reported by GitHub (`User`, `Organization`, `Bot`)
    pub user_type: String,
}

impl User {
    /// Shorthand used mostly by tests and CLI output
    pub fn with_login(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Label {
    pub id: u64,
    pub name: String,
    pub color: String,
    pub description: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: u64,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// `open` or `closed`
    #[serde(default)]
    pub state: String,
    pub due_on: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// GitHub issue snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: u64,
    /// Issue number, always greater than zero
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub state: IssueState,
    #[serde(default)]
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub author: User,
    #[serde(default)]
    pub assignees: Vec<User>,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub milestone: Option<Milestone>,
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub is_pull_request: bool,
    /// `owner/name` of the repository the issue was fetched from
    #[serde(default)]
    pub repository: Option<String>,
}

impl Issue {
    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }

    pub fn is_closed(&self) -> bool {
        self.state == IssueState::Closed
    }
}

/// GitHub repository snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    #[serde(default)]
    pub open_issues_count: u32,
    #[serde(default)]
    pub language: String,
    pub owner: User,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    pub fn issue(number: u64, title: &str) -> Issue {
        Issue {
            id: number * 1000,
            number,
            title: title.to_string(),
            body: String::new(),
            state: IssueState::Open,
            html_url: format!("https://github.com/octo/demo/issues/{}", number),
            created_at: at(1),
            updated_at: at(1),
            closed_at: None,
            author: User::with_login("octocat"),
            assignees: vec![],
            labels: vec![],
            milestone: None,
            comments: 0,
            is_pull_request: false,
            repository: Some("octo/demo".to_string()),
        }
    }

    pub fn label(name: &str) -> Label {
        Label {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn milestone(title: &str) -> Milestone {
        Milestone {
            id: 1,
            number: 1,
            title: title.to_string(),
            description: String::new(),
            state: "open".to_string(),
            due_on: None,
            created_at: Some(at(1)),
            updated_at: Some(at(1)),
        }
    }

    pub fn repository(id: u64, full_name: &str) -> Repository {
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
}
