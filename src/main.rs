//! duty-engine - HTTP server for the shift and sanction engine
//!
//! Wires together configuration loading, the store, the engine, and the
//! axum router.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use duty_engine::api::{AppState, create_router};
use duty_engine::clock::SystemClock;
use duty_engine::config::ConfigLoader;
use duty_engine::engine::DutyEngine;
use duty_engine::store::Store;

/// duty-engine - Shift and sanction accrual service
#[derive(Parser, Debug)]
#[command(name = "duty-engine")]
#[command(about = "Shift and sanction accrual service", long_about = None)]
struct Args {
    /// Configuration file path (or set DUTY_ENGINE_CONFIG env var)
    #[arg(short, long, env = "DUTY_ENGINE_CONFIG", default_value = "./config/duty-engine.yaml")]
    config: PathBuf,

    /// Bind address override
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "duty-engine starting");

    let config = ConfigLoader::load(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;
    info!(
        config_path = %args.config.display(),
        roster = config.roster().len(),
        "Configuration loaded"
    );

    let store = match &config.config().storage.snapshot_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create data directory {:?}", parent))?;
            }
            Store::open(path).with_context(|| format!("Failed to open store {:?}", path))?
        }
        None => {
            info!("No snapshot path configured, store is memory-only");
            Store::in_memory()
        }
    };

    let bind = args.bind.unwrap_or(config.config().server.bind);
    let engine = DutyEngine::new(Arc::new(store), Arc::new(SystemClock));
    let router = create_router(AppState::new(engine, config));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!(%bind, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("duty-engine stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
