//! ghim - GitHub issue manager
//!
//! Serves the REST API and offers command line exports.

mod commands;
mod web;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ghim_core::{CliOverrides, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{ExportArgs, ServeArgs};

/// ghim: browse, filter, export and bulk-edit GitHub issues
#[derive(Parser, Debug)]
#[command(name = "ghim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.config/ghim/config.toml)
    #[arg(long, global = true, env = "GHIM_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the stored token, watch list and saved filters
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Run the REST API server
    #[command(visible_alias = "s")]
    Serve(ServeArgs),

    /// Export issues to CSV or JSON
    #[command(visible_alias = "x")]
    Export(ExportArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise --verbose selects debug
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = Config::load_with_overrides(
        cli.config.as_deref(),
        CliOverrides {
            data_dir: cli.data_dir.clone(),
            ..Default::default()
        },
    )?;

    if cli.verbose {
        tracing::debug!(config = ?config, "Configuration loaded");
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("ghim {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve(args)) => {
            args.execute(config).await?;
        }
        Some(Commands::Export(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Config) => {
            print_config(&config, cli.config.as_deref());
        }
        None => {
            println!("ghim - GitHub issue manager");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config, explicit_path: Option<&std::path::Path>) {
    println!("ghim Configuration");
    println!("==================");
    println!();
    println!("Server:");
    println!("  bind: {}", config.server.bind);
    println!("  port: {}", config.server.port);
    println!();
    println!("GitHub:");
    println!("  api_url: {}", config.github.api_url);
    println!("  timeout: {:?}", config.github.timeout);
    println!("  agent_logins: {}", config.github.agent_logins.join(", "));
    println!();
    println!("API tokens:");
    println!(
        "  secret: {}",
        if config.jwt.secret.is_some() {
            "<redacted>"
        } else {
            "(generated at start-up)"
        }
    );
    println!("  issuer: {}", config.jwt.issuer);
    println!("  audience: {}", config.jwt.audience);
    println!("  expiry: {:?}", config.jwt.expiry);
    println!();
    match config.storage.resolved_data_dir() {
        Ok(dir) => println!("Data directory: {}", dir.display()),
        Err(e) => println!("Data directory: unavailable ({})", e),
    }

    let path = explicit_path
        .map(PathBuf::from)
        .or_else(Config::default_config_path);
    if let Some(path) = path {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
