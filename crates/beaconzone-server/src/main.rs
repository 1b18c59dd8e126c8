//! # beaconzone-server
//!
//! HTTP server for the beaconzone region presence system.
//!
//! This binary provides:
//! - Scan batch ingestion per region
//! - Proximity-ordered beacon lists and Enter/Leave notifications
//! - OpenAPI document at `/api/openapi.json`
//! - Structured logging to file and stdout
//!
//! ## Running
//!
//! ```bash
//! # Development
//! cargo run --package beaconzone-server
//!
//! # Production
//! BEACONZONE_ENV=production ./beaconzone-server
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use anyhow::Context;
use beaconzone_core::Config;
use beaconzone_server::state::AppState;
use beaconzone_server::{api, logging, sink};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init(logging::LogMode::from_env())?;
    api::system::init_start_time();

    info!("Starting beaconzone-server");

    let config_path = Config::resolve_path();
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let loaded_from = config_path.exists().then_some(config_path);

    info!(
        config = ?loaded_from,
        regions = config.regions.len(),
        presence_threshold = config.detector.presence_threshold,
        reset_on_leave = config.detector.reset_on_leave,
        "Configuration ready"
    );

    let host = config.server.host.clone();
    let port = config.server.port;

    let (state, sink_rx) = AppState::new(config, loaded_from);
    let state = state.into_shared();
    let worker = tokio::spawn(sink::run_notification_worker(state.clone(), sink_rx));

    let app = api::create_router(state);

    let listener = TcpListener::bind((host.as_str(), port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    worker.abort();
    info!("beaconzone-server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
