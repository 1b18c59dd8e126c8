//! Region API endpoints.
//!
//! The external scanner posts one batch per scan window to
//! `/api/regions/{region_id}/batches`. The display layer reads the ordered
//! beacon list and the presence state of each region.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use beaconzone_core::{BeaconSummary, Notification, Region, Sighting, TrackingState};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::state::SharedState;

/// Creates the regions router with all endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_regions))
        .route("/{region_id}/beacons", get(list_beacons))
        .route("/{region_id}/batches", post(ingest_batch))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Presence status of one region.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegionStatus {
    /// The region definition.
    pub region: Region,

    /// Whether a beacon is being tracked.
    pub state: TrackingState,

    /// Whether the last event in this region was an Enter.
    #[schema(example = true)]
    pub inside: bool,

    /// The tracked beacon, if any.
    pub tracked: Option<BeaconSummary>,

    /// Distinct beacons seen in this region.
    #[schema(example = 3)]
    pub beacon_count: usize,
}

/// Response listing all regions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegionsResponse {
    /// Regions in configuration order.
    pub regions: Vec<RegionStatus>,
}

/// Ordered beacon list of one region.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BeaconsResponse {
    /// Region id.
    #[schema(example = "rid")]
    pub region_id: String,

    /// Beacons, nearest first.
    pub beacons: Vec<BeaconSummary>,
}

/// One scan batch from the external scanner.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct IngestBatchRequest {
    /// Every beacon seen during the scan window. May be empty.
    #[serde(default)]
    pub sightings: Vec<Sighting>,
}

/// Result of ingesting a batch.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngestBatchResponse {
    /// Region id.
    #[schema(example = "rid")]
    pub region_id: String,

    /// Sightings merged into the registry.
    #[schema(example = 2)]
    pub accepted: usize,

    /// Sightings dropped as outside the region.
    #[schema(example = 0)]
    pub filtered: usize,

    /// Registry size after the merge.
    #[schema(example = 3)]
    pub beacon_count: usize,

    /// Notifications produced by this batch, Leave before Enter.
    pub notifications: Vec<Notification>,
}

// ============================================================================
// Handlers
// ============================================================================

/// List regions with their presence state.
#[utoipa::path(
    get,
    path = "/api/regions",
    tag = "regions",
    operation_id = "listRegions",
    summary = "List regions",
    description = "Returns every configured region with its presence state \
        and the beacon currently tracked.",
    responses(
        (status = 200, description = "Regions listed", body = RegionsResponse)
    )
)]
pub async fn list_regions(State(state): State<SharedState>) -> Json<RegionsResponse> {
    let state_guard = state.read().await;
    let threshold = state_guard.config.detector.presence_threshold;

    let regions = state_guard
        .sessions
        .iter()
        .map(|session| {
            let detector = session.detector();
            RegionStatus {
                region: session.region().clone(),
                state: detector.state(),
                inside: detector.is_inside(),
                tracked: detector.tracked().map(|beacon| {
                    BeaconSummary::from_observation(beacon, &state_guard.zones, threshold)
                }),
                beacon_count: session.registry().len(),
            }
        })
        .collect();

    Json(RegionsResponse { regions })
}

/// List the beacons of a region, nearest first.
#[utoipa::path(
    get,
    path = "/api/regions/{region_id}/beacons",
    tag = "regions",
    operation_id = "listBeacons",
    summary = "List beacons of a region",
    description = "Returns every beacon seen in the region this session, \
        ordered by proximity rank, then distance, then identifier. Beacons \
        are never removed once seen.",
    params(("region_id" = String, Path, description = "Region id")),
    responses(
        (status = 200, description = "Beacons listed", body = BeaconsResponse),
        (status = 404, description = "Unknown region", body = ErrorResponse)
    )
)]
pub async fn list_beacons(
    State(state): State<SharedState>,
    Path(region_id): Path<String>,
) -> ApiResult<Json<BeaconsResponse>> {
    let state_guard = state.read().await;
    let threshold = state_guard.config.detector.presence_threshold;
    let session = state_guard.session(&region_id)?;

    let beacons = session
        .registry()
        .ordered()
        .iter()
        .map(|o| BeaconSummary::from_observation(o, &state_guard.zones, threshold))
        .collect();

    Ok(Json(BeaconsResponse { region_id, beacons }))
}

/// Ingest one scan batch.
#[utoipa::path(
    post,
    path = "/api/regions/{region_id}/batches",
    tag = "regions",
    operation_id = "ingestBatch",
    summary = "Ingest a scan batch",
    description = "Merges the batch into the region's registry and evaluates \
        presence on the nearest beacon of the batch. Returns any Enter/Leave \
        notifications produced.",
    params(("region_id" = String, Path, description = "Region id")),
    request_body = IngestBatchRequest,
    responses(
        (status = 200, description = "Batch ingested", body = IngestBatchResponse),
        (status = 400, description = "A sighting has an empty identifier", body = ErrorResponse),
        (status = 404, description = "Unknown region", body = ErrorResponse)
    )
)]
pub async fn ingest_batch(
    State(state): State<SharedState>,
    Path(region_id): Path<String>,
    Json(request): Json<IngestBatchRequest>,
) -> ApiResult<Json<IngestBatchResponse>> {
    if request
        .sightings
        .iter()
        .any(|s| s.identifier.trim().is_empty())
    {
        return Err(ApiError::BadRequest {
            error_code: "empty_identifier".to_string(),
            message: "Sighting identifier cannot be empty".to_string(),
        });
    }

    let mut state_guard = state.write().await;
    let sink = state_guard.sink.clone();
    let outcome = state_guard
        .session_mut(&region_id)?
        .process_batch(request.sightings, &sink);

    let notifications: Vec<Notification> = outcome
        .events
        .iter()
        .map(|event| Notification::from_event(&region_id, event, &state_guard.zones))
        .collect();

    if !notifications.is_empty() {
        info!(region = %region_id, count = notifications.len(), "Batch produced notifications");
    }

    Ok(Json(IngestBatchResponse {
        region_id,
        accepted: outcome.accepted,
        filtered: outcome.filtered,
        beacon_count: outcome.registry_len,
        notifications,
    }))
}
