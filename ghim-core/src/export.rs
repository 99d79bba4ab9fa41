//! Issue export to CSV and JSON

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::{IssueFilter, StateFilter};
use crate::models::{Issue, Label, Milestone, User};
use crate::{Error, Result};

/// Name recorded as the producer of JSON exports
pub const EXPORTED_BY: &str = "ghim";

/// Version of the JSON export layout
pub const EXPORT_FORMAT_VERSION: &str = "2.0";

const CSV_HEADER: [&str; 13] = [
    "Repository",
    "Number",
    "Title",
    "State",
    "Author",
    "Assignees",
    "Labels",
    "Milestone",
    "Created",
    "Updated",
    "Closed",
    "Comments",
    "URL",
];

const CSV_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    /// Render `issues` in this format
    pub fn render(&self, issues: &[Issue], repository: &str) -> Result<String> {
        match self {
            ExportFormat::Csv => to_csv(issues, repository),
            ExportFormat::Json => to_json(issues, repository, Utc::now()),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(Error::Validation(format!(
                "Unknown export format '{}'. Expected csv or json",
                other
            ))),
        }
    }
}

/// Render issues as CSV, one row per issue
///
/// Fields containing commas, quotes or line breaks are quoted with doubled
/// inner quotes. Multi-valued columns are joined with `;`.
pub fn to_csv(issues: &[Issue], repository: &str) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;

    for issue in issues {
        let assignees = issue
            .assignees
            .iter()
            .map(|a| a.login.as_str())
            .collect::<Vec<_>>()
            .join(";");
        let labels = issue
            .labels
            .iter()
            .map(|l| l.name.as_str())
            .collect::<Vec<_>>()
            .join(";");
        let milestone = issue
            .milestone
            .as_ref()
            .map(|m| m.title.as_str())
            .unwrap_or_default();
        let closed = issue
            .closed_at
            .map(|d| d.format(CSV_TIME_FORMAT).to_string())
            .unwrap_or_default();

        let number = issue.number.to_string();
        let created = issue.created_at.format(CSV_TIME_FORMAT).to_string();
        let updated = issue.updated_at.format(CSV_TIME_FORMAT).to_string();
        let comments = issue.comments.to_string();

        let record: [&str; 13] = [
            repository,
            &number,
            &issue.title,
            issue.state.as_str(),
            &issue.author.login,
            &assignees,
            &labels,
            milestone,
            &created,
            &updated,
            &closed,
            &comments,
            &issue.html_url,
        ];
        writer.write_record(record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Other(format!("Failed to finish CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Other(format!("CSV is not UTF-8: {}", e)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    metadata: ExportMetadata<'a>,
    issues: Vec<ExportedIssue<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportMetadata<'a> {
    exported_at: DateTime<Utc>,
    repository: &'a str,
    total_issues: usize,
    exported_by: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedIssue<'a> {
    repository: &'a str,
    number: u64,
    title: &'a str,
    body: &'a str,
    state: &'static str,
    author: ExportedUser<'a>,
    assignees: Vec<ExportedUser<'a>>,
    labels: Vec<ExportedLabel<'a>>,
    milestone: Option<ExportedMilestone<'a>>,
    dates: ExportedDates,
    metrics: ExportedMetrics,
    links: ExportedLinks<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedUser<'a> {
    login: &'a str,
    avatar_url: &'a str,
    html_url: &'a str,
}

impl<'a> From<&'a User> for ExportedUser<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            login: &user.login,
            avatar_url: &user.avatar_url,
            html_url: &user.html_url,
        }
    }
}

#[derive(Serialize)]
struct ExportedLabel<'a> {
    name: &'a str,
    color: &'a str,
    description: &'a str,
}

impl<'a> From<&'a Label> for ExportedLabel<'a> {
    fn from(label: &'a Label) -> Self {
        Self {
            name: &label.name,
            color: &label.color,
            description: &label.description,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedMilestone<'a> {
    title: &'a str,
    description: &'a str,
    state: &'a str,
    due_on: Option<DateTime<Utc>>,
}

impl<'a> From<&'a Milestone> for ExportedMilestone<'a> {
    fn from(milestone: &'a Milestone) -> Self {
        Self {
            title: &milestone.title,
            description: &milestone.description,
            state: &milestone.state,
            due_on: milestone.due_on,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedDates {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedMetrics {
    comment_count: u32,
    is_pull_request: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedLinks<'a> {
    html_url: &'a str,
}

/// Render issues as a pretty-printed JSON document with export metadata
pub fn to_json(issues: &[Issue], repository: &str, exported_at: DateTime<Utc>) -> Result<String> {
    let document = ExportDocument {
        metadata: ExportMetadata {
            exported_at,
            repository,
            total_issues: issues.len(),
            exported_by: EXPORTED_BY,
            version: EXPORT_FORMAT_VERSION,
        },
        issues: issues
            .iter()
            .map(|issue| ExportedIssue {
                repository,
                number: issue.number,
                title: &issue.title,
                body: &issue.body,
                state: issue.state.as_str(),
                author: (&issue.author).into(),
                assignees: issue.assignees.iter().map(Into::into).collect(),
                labels: issue.labels.iter().map(Into::into).collect(),
                milestone: issue.milestone.as_ref().map(Into::into),
                dates: ExportedDates {
                    created_at: issue.created_at,
                    updated_at: issue.updated_at,
                    closed_at: issue.closed_at,
                },
                metrics: ExportedMetrics {
                    comment_count: issue.comments,
                    is_pull_request: issue.is_pull_request,
                },
                links: ExportedLinks {
                    html_url: &issue.html_url,
                },
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&document)?)
}

/// Build a download name such as `issues-octo-demo-2024-03-01-1200-closed-labels-2.csv`
///
/// The suffix only describes filters that are active.
pub fn generate_filename(
    repository: &str,
    filter: &IssueFilter,
    format: ExportFormat,
    now: NaiveDateTime,
) -> String {
    let timestamp = now.format("%Y-%m-%d-%H%M");
    let repo = repository.replace('/', "-");

    let mut parts = Vec::new();
    if filter.has_active_filters() {
        if filter.state != StateFilter::Open {
            parts.push(filter.state.as_str().to_string());
        }
        if !filter.assignees.is_empty() {
            parts.push(format!("assignees-{}", filter.assignees.len()));
        }
        if !filter.labels.is_empty() {
            parts.push(format!("labels-{}", filter.labels.len()));
        }
        if !filter.search_query.trim().is_empty() {
            parts.push("search".to_string());
        }
    }

    let suffix = if parts.is_empty() {
        String::new()
    } else {
        format!("-{}", parts.join("-"))
    };

    format!(
        "issues-{}-{}{}.{}",
        repo,
        timestamp,
        suffix,
        format.extension()
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Summary of what an export contains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStats {
    pub total_issues: usize,
    pub open_issues: usize,
    pub closed_issues: usize,
    pub unique_assignees: usize,
    pub unique_labels: usize,
    pub date_range: Option<DateRange>,
}

pub fn export_stats(issues: &[Issue]) -> ExportStats {
    let assignees: HashSet<&str> = issues
        .iter()
        .flat_map(|i| i.assignees.iter().map(|a| a.login.as_str()))
        .collect();
    let labels: HashSet<&str> = issues
        .iter()
        .flat_map(|i| i.labels.iter().map(|l| l.name.as_str()))
        .collect();

    let date_range = match (
        issues.iter().map(|i| i.created_at).min(),
        issues.iter().map(|i| i.updated_at).max(),
    ) {
        (Some(start_date), Some(end_date)) => Some(DateRange {
            start_date,
            end_date,
        }),
        _ => None,
    };

    ExportStats {
        total_issues: issues.len(),
        open_issues: issues.iter().filter(|i| i.is_open()).count(),
        closed_issues: issues.iter().filter(|i| i.is_closed()).count(),
        unique_assignees: assignees.len(),
        unique_labels: labels.len(),
        date_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{at, issue, label, milestone};
    use crate::models::IssueState;
    use chrono::NaiveDate;

    fn tricky_issues() -> Vec<Issue> {
        let mut a = issue(7, "Fails with \"quoted\", comma");
        a.assignees = vec![User::with_login("alice"), User::with_login("bob")];
        a.labels = vec![label("bug"), label("needs, triage")];
        a.milestone = Some(milestone("v1.0"));

        let mut b = issue(42, "Line one\nline two");
        b.state = IssueState::Closed;
        b.closed_at = Some(at(3));
        b.comments = 5;

        vec![a, b]
    }

    #[test]
    fn test_csv_header_and_row_count() {
        let csv = to_csv(&tricky_issues(), "octo/demo").unwrap();
        assert!(csv.starts_with(
            "Repository,Number,Title,State,Author,Assignees,Labels,Milestone,Created,Updated,Closed,Comments,URL\n"
        ));
        assert!(csv.contains("\"Fails with \"\"quoted\"\", comma\""));
    }

    #[test]
    fn test_csv_round_trips_awkward_values() {
        let issues = tricky_issues();
        let csv = to_csv(&issues, "octo/demo").unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);

        assert_eq!(&rows[0][0], "octo/demo");
        assert_eq!(&rows[0][1], "7");
        assert_eq!(&rows[0][2], "Fails with \"quoted\", comma");
        assert_eq!(&rows[0][5], "alice;bob");
        assert_eq!(&rows[0][6], "bug;needs, triage");
        assert_eq!(&rows[0][7], "v1.0");
        assert_eq!(&rows[0][10], "");

        assert_eq!(&rows[1][2], "Line one\nline two");
        assert_eq!(&rows[1][3], "closed");
        assert_eq!(&rows[1][10], "2024-03-03 12:00:00");
        assert_eq!(&rows[1][11], "5");
    }

    #[test]
    fn test_json_has_one_entry_per_issue_and_keeps_numbers() {
        let issues = tricky_issues();
        let json = to_json(&issues, "octo/demo", at(10)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["totalIssues"], 2);
        assert_eq!(value["metadata"]["exportedBy"], EXPORTED_BY);
        let entries = value["issues"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["number"], 7);
        assert_eq!(entries[1]["number"], 42);
        assert_eq!(entries[0]["author"]["login"], "octocat");
        assert_eq!(entries[0]["milestone"]["title"], "v1.0");
        assert!(entries[1]["milestone"].is_null());
        assert_eq!(entries[1]["metrics"]["commentCount"], 5);
        assert_eq!(entries[1]["dates"]["closedAt"], "2024-03-03T12:00:00Z");
    }

    #[test]
    fn test_json_empty_export() {
        let json = to_json(&[], "octo/demo", at(10)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["issues"].as_array().unwrap().len(), 0);
        assert_eq!(value["metadata"]["totalIssues"], 0);
    }

    #[test]
    fn test_generate_filename() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();

        let plain = generate_filename("octo/demo", &IssueFilter::default(), ExportFormat::Csv, now);
        assert_eq!(plain, "issues-octo-demo-2024-03-01-0905.csv");

        let filter = IssueFilter {
            state: StateFilter::Closed,
            labels: vec!["bug".to_string(), "ui".to_string()],
            search_query: "crash".to_string(),
            ..Default::default()
        };
        let named = generate_filename("octo/demo", &filter, ExportFormat::Json, now);
        assert_eq!(
            named,
            "issues-octo-demo-2024-03-01-0905-closed-labels-2-search.json"
        );
    }

    #[test]
    fn test_export_stats() {
        let mut issues = tricky_issues();
        issues[1].assignees = vec![User::with_login("alice")];
        issues[1].updated_at = at(9);

        let stats = export_stats(&issues);
        assert_eq!(stats.total_issues, 2);
        assert_eq!(stats.open_issues, 1);
        assert_eq!(stats.closed_issues, 1);
        assert_eq!(stats.unique_assignees, 2);
        assert_eq!(stats.unique_labels, 2);
        assert_eq!(
            stats.date_range,
            Some(DateRange {
                start_date: at(1),
                end_date: at(9)
            })
        );
        assert!(export_stats(&[]).date_range.is_none());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
