//! HTTP API routes and handlers.
//!
//! - `regions` - Scan batch ingestion, beacon lists and presence state
//! - `events` - Recent Enter/Leave notifications
//! - `config` - Read-only configuration
//! - `health` - Service health checks
//! - `system` - Version, uptime and counters
//! - `error` - API error types
//! - `openapi` - OpenAPI specification generation

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

pub mod config;
pub mod error;
pub mod events;
pub mod health;
pub mod openapi;
pub mod regions;
pub mod system;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use openapi::get_openapi_json;

/// Creates the combined API router with all endpoints.
///
/// # Route Structure
///
/// ```text
/// /health                           - Health check
/// /api
/// ├── /regions                      - Regions with presence state
/// │   ├── /{region_id}/beacons      - Ordered beacon list
/// │   └── /{region_id}/batches      - Scan batch ingestion (POST)
/// ├── /events                       - Recent notifications
/// ├── /config                       - Configuration
/// ├── /system/status                - Version, uptime, counters
/// └── /openapi.json                 - OpenAPI specification
/// ```
pub fn create_router(state: SharedState) -> Router {
    system::init_start_time();

    Router::new()
        .nest("/health", health::router())
        .nest(
            "/api",
            Router::new()
                .route("/openapi.json", get(openapi::get_openapi_spec))
                .nest("/regions", regions::router())
                .nest("/events", events::router())
                .nest("/config", config::router())
                .nest("/system", system::router()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
