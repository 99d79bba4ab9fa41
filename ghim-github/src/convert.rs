//! Conversions from octocrab models to ghim snapshots

use ghim_core::{Issue, IssueState, Label, Milestone, Repository, User};
use octocrab::models;

pub(crate) fn user(author: models::Author) -> User {
    User {
        id: author.id.0,
        login: author.login,
        avatar_url: author.avatar_url.to_string(),
        html_url: author.html_url.to_string(),
        user_type: author.r#type,
    }
}

pub(crate) fn label(label: models::Label) -> Label {
    Label {
        id: label.id.0,
        name: label.name,
        color: label.color,
        description: label.description.unwrap_or_default(),
        is_default: label.default,
    }
}

pub(crate) fn milestone(milestone: models::Milestone) -> Milestone {
    Milestone {
        id: milestone.id.0,
        number: u64::try_from(milestone.number).unwrap_or_default(),
        title: milestone.title,
        description: milestone.description.unwrap_or_default(),
        state: milestone.state.unwrap_or_default(),
        due_on: milestone.due_on,
        created_at: Some(milestone.created_at),
        updated_at: milestone.updated_at,
    }
}

pub(crate) fn issue_state(state: &models::IssueState) -> IssueState {
    match state {
        models::IssueState::Closed => IssueState::Closed,
        // Unknown states are treated as open
        _ => IssueState::Open,
    }
}

/// Convert an issue, tagging it with the repository it came from
pub(crate) fn issue(issue: models::issues::Issue, repository: &str) -> Issue {
    Issue {
        id: issue.id.0,
        number: issue.number,
        title: issue.title,
        body: issue.body.unwrap_or_default(),
        state: issue_state(&issue.state),
        html_url: issue.html_url.to_string(),
        created_at: issue.created_at,
        updated_at: issue.updated_at,
        closed_at: issue.closed_at,
        author: user(issue.user),
        assignees: issue.assignees.into_iter().map(user).collect(),
        labels: issue.labels.into_iter().map(label).collect(),
        milestone: issue.milestone.map(milestone),
        comments: issue.comments,
        is_pull_request: issue.pull_request.is_some(),
        repository: Some(repository.to_string()),
    }
}

pub(crate) fn repository(repo: models::Repository) -> Repository {
    let owner = repo.owner.map(user).unwrap_or_default();
    let full_name = repo
        .full_name
        .unwrap_or_else(|| format!("{}/{}", owner.login, repo.name));
    let language = repo
        .language
        .as_ref()
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    Repository {
        id: repo.id.0,
        name: repo.name,
        full_name,
        description: repo.description.unwrap_or_default(),
        private: repo.private.unwrap_or(false),
        html_url: repo.html_url.map(|u| u.to_string()).unwrap_or_default(),
        stargazers_count: repo.stargazers_count.unwrap_or(0),
        forks_count: repo.forks_count.unwrap_or(0),
        open_issues_count: repo.open_issues_count.unwrap_or(0),
        language,
        owner,
        created_at: repo.created_at,
        updated_at: repo.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{author_json, milestone_json};
    use serde_json::json;

    #[test]
    fn test_user_conversion() {
        let author: models::Author = serde_json::from_value(author_json("octocat", 1)).unwrap();
        let user = user(author);
        assert_eq!(user.id, 1);
        assert_eq!(user.login, "octocat");
        assert_eq!(user.html_url, "https://github.com/octocat");
        assert_eq!(user.user_type, "User");
    }

    #[test]
    fn test_label_conversion() {
        let label: models::Label = serde_json::from_value(json!({
            "id": 208045946,
            "node_id": "MDU6TGFiZWwyMDgwNDU5NDY=",
            "url": "https://api.github.com/repos/octo/demo/labels/bug",
            "name": "bug",
            "description": null,
            "color": "f29513",
            "default": true
        }))
        .unwrap();
        let label = super::label(label);
        assert_eq!(label.name, "bug");
        assert_eq!(label.description, "");
        assert!(label.is_default);
    }

    #[test]
    fn test_milestone_conversion() {
        let milestone: models::Milestone =
            serde_json::from_value(milestone_json(4, "v2.0")).unwrap();
        let milestone = super::milestone(milestone);
        assert_eq!(milestone.number, 4);
        assert_eq!(milestone.title, "v2.0");
        assert_eq!(milestone.description, "");
        assert_eq!(milestone.state, "open");
        assert!(milestone.created_at.is_some());
        assert!(milestone.due_on.is_none());
    }

    #[test]
    fn test_issue_state_conversion() {
        assert_eq!(issue_state(&models::IssueState::Open), IssueState::Open);
        assert_eq!(issue_state(&models::IssueState::Closed), IssueState::Closed);
    }
}
