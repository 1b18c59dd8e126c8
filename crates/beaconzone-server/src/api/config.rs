//! Configuration API endpoint.
//!
//! Read-only: the detector settings, regions, zones and the scan cadence the
//! external scanner should use.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use beaconzone_core::{Region, Zone};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::SharedState;

/// Creates the config router.
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(get_config))
}

// ============================================================================
// Response Types
// ============================================================================

/// Detector settings in response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "presence_threshold": 4.0,
    "reset_on_leave": false
}))]
pub struct DetectorConfigResponse {
    /// Distance in meters at or under which a beacon counts as present.
    pub presence_threshold: f64,

    /// Whether a same-zone Leave returns the region to absent.
    pub reset_on_leave: bool,
}

/// Scan cadence for the external scanner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "foreground_period_ms": 1000,
    "foreground_wait_ms": 0,
    "background_period_ms": 1000,
    "background_wait_ms": 0
}))]
pub struct ScanCadenceResponse {
    /// Foreground scan window in milliseconds.
    pub foreground_period_ms: u64,
    /// Foreground wait in milliseconds.
    pub foreground_wait_ms: u64,
    /// Background scan window in milliseconds.
    pub background_period_ms: u64,
    /// Background wait in milliseconds.
    pub background_wait_ms: u64,
}

/// Current configuration response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfigResponse {
    /// Detector settings.
    pub detector: DetectorConfigResponse,

    /// Configured regions.
    pub regions: Vec<Region>,

    /// Zone names and messages.
    pub zones: Vec<Zone>,

    /// Scan cadence.
    pub scan: ScanCadenceResponse,
}

// ============================================================================
// Handlers
// ============================================================================

/// Get the current configuration.
#[utoipa::path(
    get,
    path = "/api/config",
    tag = "config",
    operation_id = "getConfig",
    summary = "Get configuration",
    description = "Returns the presence threshold, Leave behaviour, regions, \
        zones and the scan cadence the scanner should use.",
    responses(
        (status = 200, description = "Configuration retrieved", body = ConfigResponse)
    )
)]
pub async fn get_config(State(state): State<SharedState>) -> Json<ConfigResponse> {
    let state_guard = state.read().await;
    let config = &state_guard.config;

    Json(ConfigResponse {
        detector: DetectorConfigResponse {
            presence_threshold: config.detector.presence_threshold,
            reset_on_leave: config.detector.reset_on_leave,
        },
        regions: config.regions.clone(),
        zones: state_guard.zones.iter().cloned().collect(),
        scan: ScanCadenceResponse {
            foreground_period_ms: config.scan.foreground_period_ms,
            foreground_wait_ms: config.scan.foreground_wait_ms,
            background_period_ms: config.scan.background_period_ms,
            background_wait_ms: config.scan.background_wait_ms,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_config_serialization() {
        let response = DetectorConfigResponse {
            presence_threshold: 4.0,
            reset_on_leave: false,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"presence_threshold\":4.0"));
    }
}
