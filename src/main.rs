//! Waypoint Server
//!
//! Run with: cargo run -- --config config.toml
//!
//! Loads the startup archive in the background and serves the HTTP API.
//! `RUST_LOG` overrides the configured log level.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use waypoint::api::{serve, AppState};
use waypoint::config::{generate_default_config, Config, LogFormat, LoggingConfig};
use waypoint::import::{import_archive, resolve_reference_time};
use waypoint::storage::Store;

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "In-memory store of people, places and visits")]
struct Cli {
    /// Config file (default: search the usual locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a commented default config and exit
    #[arg(long)]
    print_config: bool,

    /// Start with an empty store
    #[arg(long)]
    no_import: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {:?}", path))?,
        None => Config::load_default(),
    };

    init_logging(&config.logging)?;
    tracing::info!("Starting Waypoint v{}", env!("CARGO_PKG_VERSION"));

    let reference_time =
        resolve_reference_time(config.data.reference_time, &config.data.options_path);
    let store = Arc::new(Store::new(reference_time));

    let state = if cli.no_import {
        tracing::info!("Import disabled, starting with an empty store");
        AppState::new(store, config.api.clone())
    } else {
        let state = AppState::loading(store, config.api.clone());
        let loader = state.clone();
        let archive = config.data.archive_path.clone();

        tokio::task::spawn_blocking(move || {
            match import_archive(&loader.store, &archive) {
                Ok(summary) => tracing::info!("Loaded {}", summary),
                Err(e) => tracing::error!("Import of {:?} failed: {}", archive, e),
            }
            tracing::info!("Store ready: {}", loader.store.stats());
            loader.mark_ready();
        });

        state
    };

    serve(state, &config.api).await.context("API server failed")?;

    tracing::info!("Waypoint stopped");
    Ok(())
}

/// Install the tracing subscriber
fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("waypoint={},tower_http=info", config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
    }
    .context("installing tracing subscriber")
}
