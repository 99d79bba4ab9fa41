//! Repository discovery

use ghim_core::Repository;
use tracing::{debug, info};

use crate::{convert, Error, GitHubClient, Result};

impl GitHubClient {
    /// List repositories visible to the authenticated user
    pub async fn list_repositories(&self) -> Result<Vec<Repository>> {
        self.require_token()?;
        debug!("Listing repositories for authenticated user");

        let first = self
            .octocrab()
            .current()
            .list_repos_for_authenticated_user()
            .per_page(100)
            .send()
            .await
            .map_err(|e| Error::from_octocrab(e, "your repositories"))?;
        let repos = self
            .octocrab()
            .all_pages(first)
            .await
            .map_err(|e| Error::from_octocrab(e, "your repositories"))?;
        let all: Vec<Repository> = repos.into_iter().map(convert::repository).collect();

        info!(count = all.len(), "Fetched repositories");
        Ok(all)
    }

    /// Search public repositories (and private ones the token can see)
    pub async fn search_repositories(&self, query: &str) -> Result<Vec<Repository>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        debug!(query, "Searching repositories");

        let page = self
            .octocrab()
            .search()
            .repositories(query)
            .per_page(50)
            .send()
            .await
            .map_err(|e| Error::from_octocrab(e, query))?;

        let repos: Vec<Repository> = page.items.into_iter().map(convert::repository).collect();
        info!(query, count = repos.len(), "Repository search complete");
        Ok(repos)
    }

    /// Fetch a single repository
    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<Repository> {
        debug!(owner, repo, "Fetching repository");

        let repository = self
            .octocrab()
            .repos(owner, repo)
            .get()
            .await
            .map_err(|e| Error::from_octocrab(e, &format!("{}/{}", owner, repo)))?;

        Ok(convert::repository(repository))
    }
}
