//! # beaconzone-core
//!
//! Core logic for the beaconzone region presence system.
//!
//! This crate provides:
//! - A beacon registry that merges scan batches into a proximity-ordered view
//! - A region transition detector that turns the nearest beacon into
//!   Enter/Leave events with hysteresis
//! - Ranging sessions tying a region, a registry and a detector together
//! - Configuration management (threshold, regions, zones, scan cadence)
//!
//! ## Architecture
//!
//! - [`beacon`] - Sightings, observations, proximity ranks and the estimator seam
//! - [`registry`] - The additive, ordered beacon registry
//! - [`detector`] - Enter/Leave state machine
//! - [`region`] - Region definitions and sighting filtering
//! - [`session`] - Per-region batch processing and the event sink trait
//! - [`zones`] - Zone names and notification messages
//! - [`config`] - Configuration loading, saving, and validation
//! - [`error`] - Unified error types for the crate
//! - [`types`] - Display types and OpenAPI schemas

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

pub mod beacon;
pub mod config;
pub mod detector;
pub mod error;
pub mod region;
pub mod registry;
pub mod session;
pub mod types;
pub mod zones;

// Re-export primary types for convenience
pub use beacon::{
    nearest, proximity_order, BeaconObservation, ProximityEstimator, ProximityRank,
    ReportedEstimator, Sighting,
};
pub use config::{
    is_valid_proximity_uuid, Config, ConfigError, ConfigResult, DetectorConfig, ScanConfig,
    ServerConfig,
};
pub use detector::{
    RegionEvent, RegionEventKind, RegionTransitionDetector, TrackingState, Transition,
};
pub use error::{BeaconzoneError, Result};
pub use region::{Region, DEFAULT_PROXIMITY_UUID, DEFAULT_REGION_ID};
pub use registry::BeaconRegistry;
pub use session::{BatchOutcome, EventSink, NullSink, RangingSession};
pub use types::{BeaconSummary, Notification};
pub use zones::{default_zones, Zone, ZoneDirectory};
