//! Recent region notifications.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use beaconzone_core::Notification;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::state::SharedState;

/// Default number of notifications returned.
const DEFAULT_LIMIT: usize = 20;

/// Creates the events router.
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(get_events))
}

/// Query parameters for the events listing.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct EventsQuery {
    /// Maximum number of notifications to return (default 20).
    #[param(example = 20)]
    pub limit: Option<usize>,
}

/// Recent notifications, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventsResponse {
    /// Notifications, newest first.
    pub notifications: Vec<Notification>,

    /// Total notifications held by the server.
    #[schema(example = 4)]
    pub total: usize,
}

/// List recent Enter/Leave notifications.
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "events",
    operation_id = "getEvents",
    summary = "List recent region notifications",
    description = "Returns the most recent Enter/Leave notifications across \
        all regions, newest first. The server keeps a bounded number of them.",
    params(EventsQuery),
    responses(
        (status = 200, description = "Notifications listed", body = EventsResponse)
    )
)]
pub async fn get_events(
    State(state): State<SharedState>,
    Query(query): Query<EventsQuery>,
) -> Json<EventsResponse> {
    let state_guard = state.read().await;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    Json(EventsResponse {
        notifications: state_guard.notifications.recent(limit),
        total: state_guard.notifications.len(),
    })
}
