//! Shared display types and OpenAPI schemas.
//!
//! These are what the display and notification layer consumes: one summary
//! row per beacon and one notification per region event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::beacon::{BeaconObservation, ProximityRank};
use crate::detector::{RegionEvent, RegionEventKind};
use crate::zones::ZoneDirectory;

/// One row of the beacon list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "identifier": "D3:5F:2A:8B:11:C0",
    "label": "MAC: D3:5F:2A:8B:11:C0 (1.80m)",
    "zone_name": "Mobile Island",
    "major": 6767,
    "minor": 1,
    "measured_power": -74,
    "rssi": -67,
    "distance_m": 1.8,
    "proximity": "near",
    "is_near": true
}))]
pub struct BeaconSummary {
    /// Beacon hardware address.
    pub identifier: String,

    /// Address and distance, formatted for a list row.
    pub label: String,

    /// Zone name of the beacon's major.
    pub zone_name: String,

    /// Major value.
    pub major: u16,

    /// Minor value.
    pub minor: u16,

    /// Calibrated transmit power in dBm.
    pub measured_power: Option<i16>,

    /// Received signal strength in dBm.
    pub rssi: Option<i16>,

    /// Distance estimate in meters.
    pub distance_m: Option<f64>,

    /// Coarse proximity rank.
    pub proximity: ProximityRank,

    /// Closer than the presence threshold.
    pub is_near: bool,
}

impl BeaconSummary {
    /// Build a list row for an observation.
    #[must_use]
    pub fn from_observation(
        observation: &BeaconObservation,
        zones: &ZoneDirectory,
        presence_threshold: f64,
    ) -> Self {
        let distance = observation
            .distance_estimate
            .map_or_else(|| "?".to_string(), |d| format!("{d:.2}"));

        Self {
            identifier: observation.identifier.clone(),
            label: format!("MAC: {} ({distance}m)", observation.identifier),
            zone_name: zones.name(observation.group_id).to_string(),
            major: observation.group_id,
            minor: observation.sub_id,
            measured_power: observation.reference_power,
            rssi: observation.signal_strength,
            distance_m: observation.distance_estimate,
            proximity: observation.proximity_rank,
            is_near: observation.effective_distance() < presence_threshold,
        }
    }
}

/// A region event rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "01936a3e-8f2c-7cc3-98a1-1f2d3c4b5a69",
    "region_id": "rid",
    "kind": "enter",
    "group_id": 6767,
    "zone_name": "Mobile Island",
    "message": "Entering into the Mobile island.",
    "identifier": "D3:5F:2A:8B:11:C0",
    "distance_m": 1.8,
    "occurred_at_utc": "2025-01-15T03:30:00Z"
}))]
pub struct Notification {
    /// Id of the underlying event.
    pub id: Uuid,

    /// Region the event was detected in.
    pub region_id: String,

    /// Enter or Leave.
    pub kind: RegionEventKind,

    /// Group id (major).
    pub group_id: u16,

    /// Zone name of the group id.
    pub zone_name: String,

    /// Text to show the user.
    pub message: String,

    /// Beacon hardware address.
    pub identifier: String,

    /// Distance when the event fired.
    pub distance_m: Option<f64>,

    /// When the event fired.
    pub occurred_at_utc: DateTime<Utc>,
}

impl Notification {
    /// Render an event using the zone directory.
    #[must_use]
    pub fn from_event(region_id: &str, event: &RegionEvent, zones: &ZoneDirectory) -> Self {
        Self {
            id: event.id,
            region_id: region_id.to_string(),
            kind: event.kind,
            group_id: event.group_id,
            zone_name: zones.name(event.group_id).to_string(),
            message: zones.message(event.group_id, event.kind).to_string(),
            identifier: event.identifier.clone(),
            distance_m: event.distance_estimate,
            occurred_at_utc: event.occurred_at_utc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon::test_support::{observation, unranged};
    use crate::detector::RegionTransitionDetector;
    use crate::zones::default_zones;

    #[test]
    fn test_summary_label_and_zone() {
        let zones = ZoneDirectory::new(default_zones());
        let summary =
            BeaconSummary::from_observation(&observation("AA:BB", 7171, 1.234), &zones, 4.0);
        assert_eq!(summary.label, "MAC: AA:BB (1.23m)");
        assert_eq!(summary.zone_name, "Meeting room");
        assert!(summary.is_near);
    }

    #[test]
    fn test_summary_threshold_is_strict() {
        let zones = ZoneDirectory::default();
        let summary = BeaconSummary::from_observation(&observation("AA", 1, 4.0), &zones, 4.0);
        assert!(!summary.is_near);
        assert_eq!(summary.zone_name, "Unknown");
    }

    #[test]
    fn test_summary_for_unranged_beacon() {
        let zones = ZoneDirectory::default();
        let summary = BeaconSummary::from_observation(&unranged("AA", 1), &zones, 4.0);
        assert_eq!(summary.label, "MAC: AA (?m)");
        assert!(!summary.is_near);
        assert_eq!(summary.proximity, ProximityRank::Unknown);
    }

    #[test]
    fn test_notification_from_event() {
        let zones = ZoneDirectory::new(default_zones());
        let mut detector = RegionTransitionDetector::new(4.0);
        let events = detector
            .evaluate(&observation("AA", 2323, 1.0))
            .into_events();

        let notification = Notification::from_event("rid", &events[0], &zones);
        assert_eq!(notification.kind, RegionEventKind::Enter);
        assert_eq!(notification.zone_name, "Lunch court");
        assert_eq!(
            notification.message,
            "Entering into the Arzion food court. Dont feed the zombie!"
        );
        assert_eq!(notification.id, events[0].id);

        let json = serde_json::to_string(&notification).unwrap();
        assert!(json.contains("\"kind\":\"enter\""));
    }
}
