//! # beaconzone-server
//!
//! HTTP server library for the beaconzone region presence system.
//!
//! This library provides the API handlers, the notification sink and the
//! state management for beaconzone.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod api;
pub mod logging;
pub mod sink;
pub mod state;
