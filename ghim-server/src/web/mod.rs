//! REST API server
//!
//! All routes live under `/api`. Everything except health, login and token
//! validation requires a bearer JWT.

pub mod auth;
pub mod auth_api;
pub mod error;
pub mod filters;
pub mod issues;
pub mod mcp;
pub mod repos;
pub mod state;
pub mod watchlist;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    middleware,
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Start the web server and run until it fails
pub async fn serve(state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.config.server.bind, state.config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address {}:{}",
                state.config.server.bind, state.config.server.port
            )
        })?;

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, "ghim API listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(auth_api::login))
        .route("/auth/validate", post(auth_api::validate));

    let protected_routes = Router::new()
        // API session
        .route("/auth/logout", post(auth_api::logout))
        .route("/auth/me", get(auth_api::me))
        // MCP
        .route("/mcp/status", get(mcp::status))
        .route("/mcp/capabilities", get(mcp::capabilities))
        .route("/mcp/validate-access", post(mcp::validate_access))
        // GitHub credentials
        .route(
            "/github/token",
            put(repos::set_token).delete(repos::clear_token),
        )
        // Repositories
        .route("/repos", get(repos::list))
        .route("/repos/search", get(repos::search))
        .route("/repos/:owner/:repo", get(repos::get))
        .route("/repos/:owner/:repo/labels", get(repos::labels))
        .route("/repos/:owner/:repo/milestones", get(repos::milestones))
        .route("/repos/:owner/:repo/assignees", get(repos::assignees))
        // Issues
        .route(
            "/repos/:owner/:repo/issues",
            get(issues::list).post(issues::create),
        )
        .route("/repos/:owner/:repo/issues/export", post(issues::export))
        .route("/repos/:owner/:repo/issues/bulk", post(issues::bulk))
        .route("/repos/:owner/:repo/issues/:number", patch(issues::update))
        .route(
            "/repos/:owner/:repo/issues/:number/assignees",
            put(issues::assign),
        )
        .route(
            "/repos/:owner/:repo/issues/:number/agent-assigned",
            get(issues::agent_assigned),
        )
        // Watched repositories
        .route("/watchlist", get(watchlist::list).post(watchlist::add))
        .route(
            "/watchlist/:id",
            get(watchlist::status).delete(watchlist::remove),
        )
        // Saved filters
        .route("/filters", get(filters::list).post(filters::save))
        .route("/filters/:id", get(filters::load).delete(filters::delete))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_jwt,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness check
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_health() {
        let Json(health) = health_check().await;
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn test_router_builds() {
        let dir = TempDir::new().unwrap();
        let _router = create_router(state::test_support::state(&dir));
    }
}
