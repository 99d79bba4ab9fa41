//! Repository metadata used to populate filters: labels, milestones, assignees

use ghim_core::{Label, Milestone, User};
use octocrab::{models, Page};
use tracing::debug;

use crate::{convert, Error, GitHubClient, Result};

impl GitHubClient {
    /// All labels defined in a repository
    pub async fn list_labels(&self, owner: &str, repo: &str) -> Result<Vec<Label>> {
        let full_name = format!("{}/{}", owner, repo);
        debug!(repo = %full_name, "Listing labels");

        let first = self
            .octocrab()
            .issues(owner, repo)
            .list_labels_for_repo()
            .per_page(100)
            .send()
            .await
            .map_err(|e| Error::from_octocrab(e, &full_name))?;
        let labels = self
            .octocrab()
            .all_pages(first)
            .await
            .map_err(|e| Error::from_octocrab(e, &full_name))?;

        Ok(labels.into_iter().map(convert::label).collect())
    }

    /// Open and closed milestones of a repository
    pub async fn list_milestones(&self, owner: &str, repo: &str) -> Result<Vec<Milestone>> {
        let full_name = format!("{}/{}", owner, repo);
        debug!(repo = %full_name, "Listing milestones");

        // No typed builder for milestones; the generic GET still yields a Page
        let first: Page<models::Milestone> = self
            .octocrab()
            .get(
                format!("/repos/{}/{}/milestones", owner, repo),
                Some(&[("state", "all"), ("per_page", "100")]),
            )
            .await
            .map_err(|e| Error::from_octocrab(e, &full_name))?;
        let milestones = self
            .octocrab()
            .all_pages(first)
            .await
            .map_err(|e| Error::from_octocrab(e, &full_name))?;

        Ok(milestones.into_iter().map(convert::milestone).collect())
    }

    /// Users that issues of a repository may be assigned to
    pub async fn list_assignees(&self, owner: &str, repo: &str) -> Result<Vec<User>> {
        let full_name = format!("{}/{}", owner, repo);
        debug!(repo = %full_name, "Listing available assignees");

        let first = self
            .octocrab()
            .issues(owner, repo)
            .list_assignees()
            .per_page(100)
            .send()
            .await
            .map_err(|e| Error::from_octocrab(e, &full_name))?;
        let assignees = self
            .octocrab()
            .all_pages(first)
            .await
            .map_err(|e| Error::from_octocrab(e, &full_name))?;

        Ok(assignees.into_iter().map(convert::user).collect())
    }
}
