//! System API endpoints.

use std::sync::OnceLock;
use std::time::Instant;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::SharedState;

/// Creates the system router with all endpoints.
pub fn router() -> Router<SharedState> {
    Router::new().route("/status", get(get_status))
}

/// System status response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "version": "0.1.0",
    "uptime_secs": 3600,
    "region_count": 1,
    "beacon_count": 4,
    "notification_count": 2,
    "config_path": "/etc/beaconzone/config.toml"
}))]
pub struct SystemStatusResponse {
    /// Server version.
    #[schema(example = "0.1.0")]
    pub version: String,

    /// Server uptime in seconds.
    #[schema(example = 3600)]
    pub uptime_secs: u64,

    /// Configured regions.
    #[schema(example = 1)]
    pub region_count: usize,

    /// Distinct beacons across all regions.
    #[schema(example = 4)]
    pub beacon_count: usize,

    /// Notifications currently held.
    #[schema(example = 2)]
    pub notification_count: usize,

    /// Configuration file in use, if one was found.
    pub config_path: Option<String>,
}

// ============================================================================
// Static state for uptime tracking
// ============================================================================

static SERVER_START_TIME: OnceLock<Instant> = OnceLock::new();

/// Initialize the server start time. Call this once at startup.
pub fn init_start_time() {
    SERVER_START_TIME.get_or_init(Instant::now);
}

fn uptime_secs() -> u64 {
    SERVER_START_TIME
        .get()
        .map_or(0, |start| start.elapsed().as_secs())
}

// ============================================================================
// Handlers
// ============================================================================

/// Get system status.
#[utoipa::path(
    get,
    path = "/api/system/status",
    tag = "system",
    operation_id = "getSystemStatus",
    summary = "Get system status",
    description = "Returns version, uptime and counts of regions, beacons \
        and held notifications.",
    responses(
        (status = 200, description = "System status retrieved", body = SystemStatusResponse)
    )
)]
pub async fn get_status(State(state): State<SharedState>) -> Json<SystemStatusResponse> {
    let state_guard = state.read().await;

    Json(SystemStatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: uptime_secs(),
        region_count: state_guard.sessions.len(),
        beacon_count: state_guard
            .sessions
            .iter()
            .map(|s| s.registry().len())
            .sum(),
        notification_count: state_guard.notifications.len(),
        config_path: state_guard
            .config_path
            .as_ref()
            .map(|p| p.display().to_string()),
    })
}
