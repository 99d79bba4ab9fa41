//! Serve command - Run the REST API

use clap::Args;
use ghim_core::{CliOverrides, Config};

use crate::web::{self, state::AppState};

/// Arguments for the serve command
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind to (overrides config and env)
    #[arg(long)]
    pub bind: Option<String>,

    /// Port to listen on (overrides config and env)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Overrides these flags contribute to the configuration
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            bind: self.bind.clone(),
            port: self.port,
            data_dir: None,
        }
    }

    /// Execute the serve command
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let config = config.with_cli_overrides(self.overrides());
        tracing::info!(
            bind = %config.server.bind,
            port = config.server.port,
            api_url = %config.github.api_url,
            "Starting ghim server"
        );

        let state = AppState::new(config)?;
        if !state.github_authenticated().await {
            tracing::warn!("No GitHub token configured; issue endpoints will answer 401 until one is set");
        }

        web::serve(state).await
    }
}
