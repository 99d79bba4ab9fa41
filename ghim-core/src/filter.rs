//! Client-side issue filtering and sorting
//!
//! An [`IssueFilter`] is a conjunction of independent predicates followed by
//! a single sort. Predicates that are empty (no search text, no labels, no
//! date bound, ...) are skipped entirely.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Issue;

/// Which issue states a filter keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    #[default]
    Open,
    Closed,
    All,
}

impl StateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateFilter::Open => "open",
            StateFilter::Closed => "closed",
            StateFilter::All => "all",
        }
    }
}

impl std::str::FromStr for StateFilter {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(StateFilter::Open),
            "closed" => Ok(StateFilter::Closed),
            "all" => Ok(StateFilter::All),
            other => Err(crate::Error::Validation(format!(
                "Unknown state '{}'. Expected open, closed or all",
                other
            ))),
        }
    }
}

/// Sort key for filtered results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Created,
    #[default]
    Updated,
    Comments,
    Title,
    Number,
}

impl std::str::FromStr for SortKey {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(SortKey::Created),
            "updated" => Ok(SortKey::Updated),
            "comments" => Ok(SortKey::Comments),
            "title" => Ok(SortKey::Title),
            "number" => Ok(SortKey::Number),
            other => Err(crate::Error::Validation(format!(
                "Unknown sort key '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl std::str::FromStr for SortDirection {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(crate::Error::Validation(format!(
                "Unknown sort direction '{}'",
                other
            ))),
        }
    }
}

/// Filter criteria for issues
///
/// `Clone` before mutating a filter that is shared (the current filter of a
/// session, a saved filter); nothing here is reference counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IssueFilter {
    /// Case-insensitive text matched against title, body, author and assignees
    pub search_query: String,
    pub state: StateFilter,
    /// Assignee logins; an issue matches if any assignee is listed
    pub assignees: Vec<String>,
    /// Label names; an issue matches if any label is listed
    pub labels: Vec<String>,
    /// Milestone title
    pub milestone: Option<String>,
    /// Repository full names (`owner/name`)
    pub repositories: Vec<String>,
    /// Author login
    pub author: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
    pub closed_after: Option<DateTime<Utc>>,
    pub closed_before: Option<DateTime<Utc>>,
    pub sort_by: SortKey,
    pub sort_direction: SortDirection,
}

/// Counts describing how much a filter narrowed a set of issues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterStats {
    pub total_issues: usize,
    pub filtered_issues: usize,
    pub open_issues: usize,
    pub closed_issues: usize,
    pub filtered_percentage: f64,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn contains_ignore_case(list: &[String], value: &str) -> bool {
    list.iter().any(|item| eq_ignore_case(item, value))
}

impl IssueFilter {
    /// Whether anything beyond the default "open issues" view is selected
    ///
    /// Sort settings never count as an active filter.
    pub fn has_active_filters(&self) -> bool {
        !self.search_query.trim().is_empty()
            || self.state != StateFilter::Open
            || !self.assignees.is_empty()
            || !self.labels.is_empty()
            || !is_blank(&self.milestone)
            || !self.repositories.is_empty()
            || self.created_after.is_some()
            || self.created_before.is_some()
            || self.updated_after.is_some()
            || self.updated_before.is_some()
            || self.closed_after.is_some()
            || self.closed_before.is_some()
            || !is_blank(&self.author)
    }

    /// Reset every criterion, including sorting, to its default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check a single issue against every active predicate
    pub fn matches(&self, issue: &Issue) -> bool {
        let query = self.search_query.trim();
        if !query.is_empty() {
            let query = query.to_lowercase();
            let hit = issue.title.to_lowercase().contains(&query)
                || issue.body.to_lowercase().contains(&query)
                || issue.author.login.to_lowercase().contains(&query)
                || issue
                    .assignees
                    .iter()
                    .any(|a| a.login.to_lowercase().contains(&query));
            if !hit {
                return false;
            }
        }

        let state_ok = match self.state {
            StateFilter::Open => issue.is_open(),
            StateFilter::Closed => issue.is_closed(),
            StateFilter::All => true,
        };
        if !state_ok {
            return false;
        }

        if !self.assignees.is_empty()
            && !issue
                .assignees
                .iter()
                .any(|a| contains_ignore_case(&self.assignees, &a.login))
        {
            return false;
        }

        if !self.labels.is_empty()
            && !issue
                .labels
                .iter()
                .any(|l| contains_ignore_case(&self.labels, &l.name))
        {
            return false;
        }

        if let Some(milestone) = self.milestone.as_deref().filter(|m| !m.trim().is_empty()) {
            match &issue.milestone {
                Some(m) if eq_ignore_case(&m.title, milestone) => {}
                _ => return false,
            }
        }

        if !self.repositories.is_empty() {
            match issue.repository.as_deref() {
                Some(repo) if contains_ignore_case(&self.repositories, repo) => {}
                _ => return false,
            }
        }

        if let Some(author) = self.author.as_deref().filter(|a| !a.trim().is_empty()) {
            if !eq_ignore_case(&issue.author.login, author) {
                return false;
            }
        }

        within(Some(issue.created_at), self.created_after, self.created_before)
            && within(Some(issue.updated_at), self.updated_after, self.updated_before)
            && within(issue.closed_at, self.closed_after, self.closed_before)
    }

    /// Filter and sort a collection of issues
    ///
    /// The sort is stable: issues with equal keys keep their input order,
    /// whichever direction is requested.
    pub fn apply<'a, I>(&self, issues: I) -> Vec<Issue>
    where
        I: IntoIterator<Item = &'a Issue>,
    {
        let mut filtered: Vec<Issue> = issues
            .into_iter()
            .filter(|issue| self.matches(issue))
            .cloned()
            .collect();

        let key = self.sort_by;
        match self.sort_direction {
            SortDirection::Ascending => filtered.sort_by(|a, b| compare(key, a, b)),
            SortDirection::Descending => filtered.sort_by(|a, b| compare(key, b, a)),
        }

        filtered
    }

    /// Summarize a filtering pass
    pub fn stats(all: &[Issue], filtered: &[Issue]) -> FilterStats {
        let total = all.len();
        let count = filtered.len();
        FilterStats {
            total_issues: total,
            filtered_issues: count,
            open_issues: filtered.iter().filter(|i| i.is_open()).count(),
            closed_issues: filtered.iter().filter(|i| i.is_closed()).count(),
            filtered_percentage: if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        }
    }
}

/// Inclusive date-range check; a missing date never satisfies a bound
fn within(
    value: Option<DateTime<Utc>>,
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
) -> bool {
    if after.is_none() && before.is_none() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    after.map_or(true, |a| value >= a) && before.map_or(true, |b| value <= b)
}

fn compare(key: SortKey, a: &Issue, b: &Issue) -> Ordering {
    match key {
        SortKey::Created => a.created_at.cmp(&b.created_at),
        SortKey::Updated => a.updated_at.cmp(&b.updated_at),
        SortKey::Comments => a.comments.cmp(&b.comments),
        SortKey::Number => a.number.cmp(&b.number),
        SortKey::Title => a
            .title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.title.cmp(&b.title)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{at, issue, label, milestone};
    use crate::models::{IssueState, User};

    fn sample() -> Vec<Issue> {
        let mut a = issue(1, "Crash when saving");
        a.labels = vec![label("bug")];
        a.assignees = vec![User::with_login("alice")];
        a.updated_at = at(5);
        a.comments = 3;

        let mut b = issue(2, "Add dark mode");
        b.labels = vec![label("enhancement")];
        b.body = "Users keep asking for a CRASH-free dark theme".to_string();
        b.updated_at = at(9);
        b.milestone = Some(milestone("v1.0"));

        let mut c = issue(3, "Old bug");
        c.state = IssueState::Closed;
        c.closed_at = Some(at(7));
        c.labels = vec![label("Bug")];
        c.author = User::with_login("bob");
        c.updated_at = at(7);

        vec![a, b, c]
    }

    fn numbers(issues: &[Issue]) -> Vec<u64> {
        issues.iter().map(|i| i.number).collect()
    }

    #[test]
    fn test_default_filter_keeps_open_sorted_by_updated_desc() {
        let filter = IssueFilter::default();
        assert_eq!(numbers(&filter.apply(&sample())), vec![2, 1]);
    }

    #[test]
    fn test_has_active_filters() {
        let mut filter = IssueFilter::default();
        assert!(!filter.has_active_filters());

        filter.sort_by = SortKey::Title;
        filter.sort_direction = SortDirection::Ascending;
        assert!(!filter.has_active_filters());

        filter.search_query = "   ".to_string();
        assert!(!filter.has_active_filters());

        filter.milestone = Some("v1".to_string());
        assert!(filter.has_active_filters());

        filter.reset();
        assert_eq!(filter, IssueFilter::default());

        filter.state = StateFilter::All;
        assert!(filter.has_active_filters());
    }

    #[test]
    fn test_search_matches_body_case_insensitive() {
        let filter = IssueFilter {
            search_query: "crash".to_string(),
            ..Default::default()
        };
        assert_eq!(numbers(&filter.apply(&sample())), vec![2, 1]);
    }

    #[test]
    fn test_search_matches_assignee_login() {
        let filter = IssueFilter {
            search_query: "ALI".to_string(),
            ..Default::default()
        };
        assert_eq!(numbers(&filter.apply(&sample())), vec![1]);
    }

    #[test]
    fn test_label_filter_is_case_insensitive_and_any_of() {
        let filter = IssueFilter {
            state: StateFilter::All,
            labels: vec!["BUG".to_string(), "docs".to_string()],
            ..Default::default()
        };
        assert_eq!(numbers(&filter.apply(&sample())), vec![3, 1]);
    }

    #[test]
    fn test_milestone_excludes_issues_without_one() {
        let filter = IssueFilter {
            milestone: Some("V1.0".to_string()),
            ..Default::default()
        };
        assert_eq!(numbers(&filter.apply(&sample())), vec![2]);
    }

    #[test]
    fn test_author_and_state_closed() {
        let filter = IssueFilter {
            state: StateFilter::Closed,
            author: Some("Bob".to_string()),
            ..Default::default()
        };
        assert_eq!(numbers(&filter.apply(&sample())), vec![3]);
    }

    #[test]
    fn test_repository_filter() {
        let mut issues = sample();
        issues[0].repository = Some("other/place".to_string());
        let filter = IssueFilter {
            repositories: vec!["Other/Place".to_string()],
            ..Default::default()
        };
        assert_eq!(numbers(&filter.apply(&issues)), vec![1]);
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let filter = IssueFilter {
            state: StateFilter::All,
            updated_after: Some(at(7)),
            updated_before: Some(at(9)),
            ..Default::default()
        };
        assert_eq!(numbers(&filter.apply(&sample())), vec![2, 3]);
    }

    #[test]
    fn test_closed_bound_skips_never_closed_issues() {
        let filter = IssueFilter {
            state: StateFilter::All,
            closed_before: Some(at(30)),
            ..Default::default()
        };
        assert_eq!(numbers(&filter.apply(&sample())), vec![3]);
    }

    #[test]
    fn test_sort_keys_and_directions() {
        let mut filter = IssueFilter {
            state: StateFilter::All,
            sort_by: SortKey::Title,
            sort_direction: SortDirection::Ascending,
            ..Default::default()
        };
        assert_eq!(numbers(&filter.apply(&sample())), vec![2, 1, 3]);

        filter.sort_by = SortKey::Comments;
        filter.sort_direction = SortDirection::Descending;
        assert_eq!(numbers(&filter.apply(&sample()))[0], 1);

        filter.sort_by = SortKey::Number;
        assert_eq!(numbers(&filter.apply(&sample())), vec![3, 2, 1]);
    }

    #[test]
    fn test_equal_keys_keep_input_order_in_both_directions() {
        let issues = vec![issue(10, "a"), issue(4, "b"), issue(7, "c")];
        let mut filter = IssueFilter {
            sort_by: SortKey::Created,
            ..Default::default()
        };
        assert_eq!(numbers(&filter.apply(&issues)), vec![10, 4, 7]);

        filter.sort_direction = SortDirection::Ascending;
        assert_eq!(numbers(&filter.apply(&issues)), vec![10, 4, 7]);
    }

    #[test]
    fn test_result_is_subset_obeying_every_predicate() {
        let issues = sample();
        let filter = IssueFilter {
            state: StateFilter::All,
            labels: vec!["bug".to_string()],
            search_query: "bug".to_string(),
            ..Default::default()
        };
        let result = filter.apply(&issues);
        assert!(!result.is_empty());
        for issue in &result {
            assert!(issues.contains(issue));
            assert!(filter.matches(issue));
        }
        assert_eq!(numbers(&result), vec![3]);
    }

    #[test]
    fn test_stats() {
        let all = sample();
        let filter = IssueFilter {
            state: StateFilter::All,
            labels: vec!["bug".to_string()],
            ..Default::default()
        };
        let filtered = filter.apply(&all);
        let stats = IssueFilter::stats(&all, &filtered);
        assert_eq!(stats.total_issues, 3);
        assert_eq!(stats.filtered_issues, 2);
        assert_eq!(stats.open_issues, 1);
        assert_eq!(stats.closed_issues, 1);
        assert!((stats.filtered_percentage - 66.666).abs() < 0.01);

        let empty = IssueFilter::stats(&[], &[]);
        assert_eq!(empty.filtered_percentage, 0.0);
    }

    #[test]
    fn test_parse_query_values() {
        assert_eq!("ALL".parse::<StateFilter>().unwrap(), StateFilter::All);
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Ascending);
        assert_eq!("comments".parse::<SortKey>().unwrap(), SortKey::Comments);
        assert!("sideways".parse::<SortDirection>().is_err());
    }

    #[test]
    fn test_filter_json_uses_camel_case() {
        let filter = IssueFilter {
            search_query: "x".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["searchQuery"], "x");
        assert_eq!(json["sortBy"], "updated");
        assert_eq!(json["sortDirection"], "descending");
    }
}
