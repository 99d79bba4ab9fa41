//! Local stand-in for the GitHub REST API

use std::collections::HashMap;

use axum::{
    extract::Query,
    http::{header::LINK, HeaderMap},
    routing::{get, MethodRouter},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::{GitHubClient, GitHubSettings};

/// A bound listener; routes are attached with [`TestServer::serve`]
pub(crate) struct TestServer {
    listener: TcpListener,
    pub base: String,
}

impl TestServer {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        Self { listener, base }
    }

    /// Client whose API root is this server
    pub fn client(&self, token: Option<&str>) -> GitHubClient {
        let settings = GitHubSettings {
            api_url: self.base.clone(),
            ..Default::default()
        };
        GitHubClient::new(token.map(str::to_string), settings).unwrap()
    }

    pub fn serve(self, router: Router) {
        tokio::spawn(async move {
            axum::serve(self.listener, router).await.unwrap();
        });
    }
}

/// GET handler serving `pages` in order, linking each to the next like GitHub
pub(crate) fn paged(base: &str, path: &str, pages: Vec<Value>) -> MethodRouter {
    let url = format!("{}{}", base, path);
    get(move |Query(query): Query<HashMap<String, String>>| async move {
        let page = query
            .get("page")
            .and_then(|p| p.parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);
        let mut headers = HeaderMap::new();
        if page < pages.len() {
            let link = format!("<{}?per_page=100&page={}>; rel=\"next\"", url, page + 1);
            headers.insert(LINK, link.parse().unwrap());
        }
        let body = pages.get(page - 1).cloned().unwrap_or_else(|| json!([]));
        (headers, Json(body))
    })
}

pub(crate) fn author_json(login: &str, id: u64) -> Value {
    json!({
        "login": login,
        "id": id,
        "node_id": "MDQ6VXNlcjE=",
        "avatar_url": format!("https://avatars.githubusercontent.com/u/{}", id),
        "gravatar_id": "",
        "url": format!("https://api.github.com/users/{}", login),
        "html_url": format!("https://github.com/{}", login),
        "followers_url": format!("https://api.github.com/users/{}/followers", login),
        "following_url": format!("https://api.github.com/users/{}/following", login),
        "gists_url": format!("https://api.github.com/users/{}/gists", login),
        "starred_url": format!("https://api.github.com/users/{}/starred", login),
        "subscriptions_url": format!("https://api.github.com/users/{}/subscriptions", login),
        "organizations_url": format!("https://api.github.com/users/{}/orgs", login),
        "repos_url": format!("https://api.github.com/users/{}/repos", login),
        "events_url": format!("https://api.github.com/users/{}/events", login),
        "received_events_url": format!("https://api.github.com/users/{}/received_events", login),
        "type": "User",
        "site_admin": false
    })
}

pub(crate) fn milestone_json(number: u64, title: &str) -> Value {
    json!({
        "url": format!("https://api.github.com/repos/octo/demo/milestones/{}", number),
        "html_url": format!("https://github.com/octo/demo/milestone/{}", number),
        "labels_url": format!("https://api.github.com/repos/octo/demo/milestones/{}/labels", number),
        "id": 1000 + number,
        "node_id": "MDk6TWlsZXN0b25lMTAwMg==",
        "number": number,
        "state": "open",
        "title": title,
        "description": null,
        "open_issues": 0,
        "closed_issues": 0,
        "created_at": "2024-01-10T12:00:00Z",
        "updated_at": "2024-01-11T12:00:00Z",
        "closed_at": null,
        "due_on": null
    })
}
