//! Export command - Write a repository's issues to a CSV or JSON file

use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::{Args, ValueEnum};
use ghim_core::export::{export_stats, generate_filename};
use ghim_core::{Config, CredentialStore, ExportFormat, IssueFilter, StateFilter};
use ghim_github::{parse_repo_ref, GitHubClient};

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Repository (owner/repo or GitHub URL)
    #[arg(required = true)]
    pub repo: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: FormatArg,

    /// Filter by state
    #[arg(short, long, value_enum, default_value = "open")]
    pub state: StateArg,

    /// Only issues with this label (repeatable)
    #[arg(short, long)]
    pub label: Vec<String>,

    /// Only issues assigned to this login (repeatable)
    #[arg(short, long)]
    pub assignee: Vec<String>,

    /// Free-text search over title, body and people
    #[arg(long)]
    pub search: Option<String>,

    /// Output file (defaults to a generated name in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StateArg {
    Open,
    Closed,
    All,
}

impl From<StateArg> for StateFilter {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Open => StateFilter::Open,
            StateArg::Closed => StateFilter::Closed,
            StateArg::All => StateFilter::All,
        }
    }
}

impl ExportArgs {
    /// Filter built from the command line flags
    pub fn filter(&self) -> IssueFilter {
        IssueFilter {
            search_query: self.search.clone().unwrap_or_default(),
            state: self.state.into(),
            labels: self.label.clone(),
            assignees: self.assignee.clone(),
            ..Default::default()
        }
    }

    /// Execute the export command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let repo = parse_repo_ref(&self.repo)?;
        let full_name = repo.full_name();
        let format: ExportFormat = self.format.into();
        let filter = self.filter();

        let data_dir = config.storage.resolved_data_dir()?;
        let credentials = CredentialStore::open(&data_dir)?;
        let client = GitHubClient::from_config(credentials.token(), &config.github)?;

        if verbose {
            tracing::info!(repo = %full_name, ?format, ?filter, "Starting export");
        }

        let all = client
            .list_issues(&repo.owner, &repo.name)
            .await
            .with_context(|| format!("Failed to fetch issues for {}", full_name))?;
        let issues = filter.apply(&all);
        let document = format.render(&issues, &full_name)?;

        let output = self.output.clone().unwrap_or_else(|| {
            PathBuf::from(generate_filename(
                &full_name,
                &filter,
                format,
                Local::now().naive_local(),
            ))
        });
        std::fs::write(&output, document)
            .with_context(|| format!("Failed to write {}", output.display()))?;

        let stats = export_stats(&issues);
        println!("Exported {} of {} issues from {}", issues.len(), all.len(), full_name);
        println!("  open: {}, closed: {}", stats.open_issues, stats.closed_issues);
        println!(
            "  assignees: {}, labels: {}",
            stats.unique_assignees, stats.unique_labels
        );
        if let Some(range) = stats.date_range {
            println!(
                "  from {} to {}",
                range.start_date.format("%Y-%m-%d"),
                range.end_date.format("%Y-%m-%d")
            );
        }
        println!("Written to {}", output.display());

        Ok(())
    }
}
