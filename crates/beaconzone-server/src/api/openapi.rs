//! OpenAPI specification generation for the beaconzone API.

use axum::Json;
use utoipa::OpenApi;

use beaconzone_core::{
    BeaconSummary, Notification, ProximityRank, Region, RegionEventKind, Sighting, TrackingState,
    Zone,
};

use super::config::{ConfigResponse, DetectorConfigResponse, ScanCadenceResponse};
use super::error::ErrorResponse;
use super::events::EventsResponse;
use super::health::HealthResponse;
use super::regions::{
    BeaconsResponse, IngestBatchRequest, IngestBatchResponse, RegionStatus, RegionsResponse,
};
use super::system::SystemStatusResponse;

/// Serve the OpenAPI specification as JSON at `/api/openapi.json`.
pub async fn get_openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Returns the OpenAPI specification as pretty JSON.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn get_openapi_json() -> serde_json::Result<String> {
    ApiDoc::openapi().to_pretty_json()
}

/// Main OpenAPI document structure for beaconzone.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "beaconzone API",
        version = "0.1.0",
        description = r#"
# beaconzone API

beaconzone turns periodic beacon scans into a live, proximity-ordered beacon
list and Enter/Leave notifications for physical zones.

## Overview

1. **Ingest**: the scanner posts one batch per scan window to
   `/api/regions/{region_id}/batches`
2. **Beacons**: every beacon ever seen in a region, nearest first
3. **Presence**: Enter/Leave notifications with hysteresis, so a beacon
   hovering around the threshold does not flap

A different beacon only takes over a region when it is inside the presence
threshold and strictly closer than the tracked one.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Local beaconzone server")
    ),
    tags(
        (name = "system", description = "Health checks and system status"),
        (name = "regions", description = "Scan batch ingestion, beacon lists and presence state"),
        (name = "events", description = "Recent Enter/Leave notifications"),
        (name = "config", description = "Detector settings, regions, zones and scan cadence")
    ),
    paths(
        super::health::health_check,
        super::system::get_status,
        super::regions::list_regions,
        super::regions::list_beacons,
        super::regions::ingest_batch,
        super::events::get_events,
        super::config::get_config,
    ),
    components(
        schemas(
            // Error types
            ErrorResponse,
            // Health & system
            HealthResponse,
            SystemStatusResponse,
            // Regions
            Region,
            RegionStatus,
            RegionsResponse,
            TrackingState,
            BeaconsResponse,
            BeaconSummary,
            ProximityRank,
            Sighting,
            IngestBatchRequest,
            IngestBatchResponse,
            // Events
            Notification,
            RegionEventKind,
            EventsResponse,
            // Config
            ConfigResponse,
            DetectorConfigResponse,
            ScanCadenceResponse,
            Zone,
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generation() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "beaconzone API");
        assert!(spec.paths.paths.contains_key("/api/regions/{region_id}/batches"));
    }

    #[test]
    fn test_openapi_json_serialization() {
        let json = get_openapi_json().unwrap();
        assert!(json.contains("\"openapi\":"));
        assert!(json.contains("\"beaconzone API\""));
    }
}
