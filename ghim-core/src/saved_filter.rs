//! Named, persisted issue filters
//!
//! Like the watch list, saved filters are owned by one background task and
//! reached through [`SavedFiltersHandle`].

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use crate::filter::IssueFilter;
use crate::store::JsonFile;
use crate::{Error, Result};

/// File name of the saved filters inside the data directory
pub const SAVED_FILTERS_FILE: &str = "saved-filters.json";

/// A filter stored under a name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFilter {
    pub id: String,
    pub name: String,
    pub filter: IssueFilter,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

impl SavedFilter {
    pub fn new(name: impl Into<String>, filter: IssueFilter) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            filter,
            created_at: now,
            last_used: now,
        }
    }
}

#[derive(Debug)]
enum SavedFiltersRequest {
    List {
        reply: oneshot::Sender<Vec<SavedFilter>>,
    },
    Save {
        name: String,
        filter: IssueFilter,
        reply: oneshot::Sender<SavedFilter>,
    },
    Load {
        id: String,
        reply: oneshot::Sender<Option<IssueFilter>>,
    },
    Delete {
        id: String,
        reply: oneshot::Sender<bool>,
    },
}

#[derive(Debug, Clone)]
pub struct SavedFiltersHandle {
    sender: mpsc::Sender<SavedFiltersRequest>,
}

impl SavedFiltersHandle {
    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<R>) -> SavedFiltersRequest,
    ) -> Result<R> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| Error::StoreClosed("saved filters"))?;
        rx.await.map_err(|_| Error::StoreClosed("saved filters"))
    }

    /// Saved filters, most recently used first
    pub async fn list(&self) -> Result<Vec<SavedFilter>> {
        self.request(|reply| SavedFiltersRequest::List { reply })
            .await
    }

    /// Save a copy of `filter` under `name`
    ///
    /// An existing filter with the same name (ignoring case) is replaced.
    pub async fn save(&self, name: &str, filter: &IssueFilter) -> Result<SavedFilter> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Filter name is required".to_string()));
        }
        let name = name.to_string();
        let filter = filter.clone();
        self.request(|reply| SavedFiltersRequest::Save {
            name,
            filter,
            reply,
        })
        .await
    }

    /// Fetch the filter saved under `id` and mark it as used
    pub async fn load(&self, id: &str) -> Result<Option<IssueFilter>> {
        let id = id.to_string();
        self.request(|reply| SavedFiltersRequest::Load { id, reply })
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.request(|reply| SavedFiltersRequest::Delete { id, reply })
            .await
    }
}

/// Owner of the saved filter list
pub struct SavedFilters {
    filters: Vec<SavedFilter>,
    file: JsonFile<Vec<SavedFilter>>,
}

impl SavedFilters {
    pub fn open(data_dir: &Path) -> Self {
        let file = JsonFile::new(data_dir.join(SAVED_FILTERS_FILE));
        let filters = file.load();
        Self { filters, file }
    }

    pub fn spawn(self) -> SavedFiltersHandle {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            self.run(rx).await;
        });
        SavedFiltersHandle { sender: tx }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<SavedFiltersRequest>) {
        info!(count = self.filters.len(), "Saved filters started");

        while let Some(request) = rx.recv().await {
            match request {
                SavedFiltersRequest::List { reply } => {
                    let mut filters = self.filters.clone();
                    filters.sort_by(|a, b| b.last_used.cmp(&a.last_used));
                    let _ = reply.send(filters);
                }
                SavedFiltersRequest::Save {
                    name,
                    filter,
                    reply,
                } => {
                    let _ = reply.send(self.save(name, filter));
                }
                SavedFiltersRequest::Load { id, reply } => {
                    let _ = reply.send(self.load(&id));
                }
                SavedFiltersRequest::Delete { id, reply } => {
                    let before = self.filters.len();
                    self.filters.retain(|f| f.id != id);
                    let removed = self.filters.len() != before;
                    if removed {
                        info!(id = %id, "Deleted saved filter");
                        self.persist();
                    }
                    let _ = reply.send(removed);
                }
            }
        }

        info!("Saved filters stopped");
    }

    fn save(&mut self, name: String, filter: IssueFilter) -> SavedFilter {
        let lowered = name.to_lowercase();
        self.filters.retain(|f| f.name.to_lowercase() != lowered);

        let saved = SavedFilter::new(name, filter);
        info!(id = %saved.id, name = %saved.name, "Saved filter");
        self.filters.push(saved.clone());
        self.persist();
        saved
    }

    fn load(&mut self, id: &str) -> Option<IssueFilter> {
        let saved = self.filters.iter_mut().find(|f| f.id == id)?;
        saved.last_used = Utc::now();
        let filter = saved.filter.clone();
        self.persist();
        Some(filter)
    }

    fn persist(&self) {
        if let Err(e) = self.file.save(&self.filters) {
            error!(error = %e, "Failed to save filters");
        }
    }
}
