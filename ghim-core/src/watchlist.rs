//! Watched repositories
//!
//! The list is owned by a single background task. Callers talk to it through
//! a cloneable [`WatchlistHandle`], so every read and write is serialized
//! through one owner and the JSON file is only ever written by that task.

use std::path::Path;

use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use crate::models::Repository;
use crate::store::JsonFile;
use crate::{Error, Result};

/// File name of the watch list inside the data directory
pub const WATCHLIST_FILE: &str = "watched-repositories.json";

#[derive(Debug)]
enum WatchlistRequest {
    List {
        reply: oneshot::Sender<Vec<Repository>>,
    },
    Add {
        repository: Repository,
        reply: oneshot::Sender<bool>,
    },
    Remove {
        id: u64,
        reply: oneshot::Sender<Option<Repository>>,
    },
    Contains {
        id: u64,
        reply: oneshot::Sender<bool>,
    },
}

/// Handle for the watch list task
///
/// Cheap to clone; all clones talk to the same task.
#[derive(Debug, Clone)]
pub struct WatchlistHandle {
    sender: mpsc::Sender<WatchlistRequest>,
}

impl WatchlistHandle {
    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<R>) -> WatchlistRequest,
    ) -> Result<R> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| Error::StoreClosed("watchlist"))?;
        rx.await.map_err(|_| Error::StoreClosed("watchlist"))
    }

    /// All watched repositories, in the order they were added
    pub async fn list(&self) -> Result<Vec<Repository>> {
        self.request(|reply| WatchlistRequest::List { reply }).await
    }

    /// Watch a repository; returns false if it was already watched
    pub async fn add(&self, repository: Repository) -> Result<bool> {
        self.request(|reply| WatchlistRequest::Add { repository, reply })
            .await
    }

    /// Stop watching a repository; returns the removed entry, if any
    pub async fn remove(&self, id: u64) -> Result<Option<Repository>> {
        self.request(|reply| WatchlistRequest::Remove { id, reply })
            .await
    }

    pub async fn contains(&self, id: u64) -> Result<bool> {
        self.request(|reply| WatchlistRequest::Contains { id, reply })
            .await
    }
}

/// Owner of the watched repository list
pub struct Watchlist {
    repositories: Vec<Repository>,
    file: JsonFile<Vec<Repository>>,
}

impl Watchlist {
    /// Load the list from `<data_dir>/watched-repositories.json`
    pub fn open(data_dir: &Path) -> Self {
        let file = JsonFile::new(data_dir.join(WATCHLIST_FILE));
        let repositories = file.load();
        Self { repositories, file }
    }

    /// Spawn the owner task and return a handle to it
    pub fn spawn(self) -> WatchlistHandle {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            self.run(rx).await;
        });
        WatchlistHandle { sender: tx }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<WatchlistRequest>) {
        info!(count = self.repositories.len(), "Watchlist started");

        while let Some(request) = rx.recv().await {
            match request {
                WatchlistRequest::List { reply } => {
                    let _ = reply.send(self.repositories.clone());
                }
                WatchlistRequest::Add { repository, reply } => {
                    let _ = reply.send(self.add(repository));
                }
                WatchlistRequest::Remove { id, reply } => {
                    let _ = reply.send(self.remove(id));
                }
                WatchlistRequest::Contains { id, reply } => {
                    let _ = reply.send(self.repositories.iter().any(|r| r.id == id));
                }
            }
        }

        info!("Watchlist stopped");
    }

    fn add(&mut self, repository: Repository) -> bool {
        if self.repositories.iter().any(|r| r.id == repository.id) {
            return false;
        }
        info!(full_name = %repository.full_name, "Added repository to watchlist");
        self.repositories.push(repository);
        self.persist();
        true
    }

    fn remove(&mut self, id: u64) -> Option<Repository> {
        let index = self.repositories.iter().position(|r| r.id == id)?;
        let removed = self.repositories.remove(index);
        info!(full_name = %removed.full_name, "Removed repository from watchlist");
        self.persist();
        Some(removed)
    }

    fn persist(&self) {
        if let Err(e) = self.file.save(&self.repositories) {
            error!(error = %e, "Failed to save watched repositories");
        }
    }
}
