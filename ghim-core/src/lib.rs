//! ghim core - domain model and local state for the ghim issue manager
//!
//! This crate holds everything that does not talk to GitHub: issue
//! filtering and export, API tokens, configuration, and the small JSON
//! stores for credentials, watched repositories and saved filters.

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod saved_filter;
pub mod store;
pub mod watchlist;

pub use auth::{Claims, IssuedToken, JwtIssuer};
pub use config::{CliOverrides, Config};
pub use credentials::CredentialStore;
pub use error::{Error, Result};
pub use export::{ExportFormat, ExportStats};
pub use filter::{FilterStats, IssueFilter, SortDirection, SortKey, StateFilter};
pub use models::{Issue, IssueState, Label, Milestone, Repository, User};
pub use saved_filter::{SavedFilter, SavedFilters, SavedFiltersHandle};
pub use watchlist::{Watchlist, WatchlistHandle};
