//! Scanning regions.
//!
//! A region scopes which beacons a ranging session cares about: a proximity
//! UUID plus optional major and minor values. `None` acts as a wildcard.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::beacon::Sighting;

/// Region id used when no region is configured.
pub const DEFAULT_REGION_ID: &str = "rid";

/// Proximity UUID of the default region.
pub const DEFAULT_PROXIMITY_UUID: &str = "13817c83-7d22-4d5f-9f29-7a54f0ad7fac";

/// A beacon region handed to the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "rid",
    "proximity_uuid": "13817c83-7d22-4d5f-9f29-7a54f0ad7fac",
    "major": null,
    "minor": null
}))]
pub struct Region {
    /// Region identifier.
    #[schema(example = "rid")]
    pub id: String,

    /// Proximity UUID to match, case-insensitive.
    #[schema(example = "13817c83-7d22-4d5f-9f29-7a54f0ad7fac")]
    pub proximity_uuid: String,

    /// Major to match, or any.
    #[serde(default)]
    pub major: Option<u16>,

    /// Minor to match, or any.
    #[serde(default)]
    pub minor: Option<u16>,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            id: DEFAULT_REGION_ID.to_string(),
            proximity_uuid: DEFAULT_PROXIMITY_UUID.to_string(),
            major: None,
            minor: None,
        }
    }
}

impl Region {
    /// Whether a sighting belongs to this region.
    ///
    /// Sightings without a proximity UUID are assumed to come from a scan
    /// already scoped to this region.
    #[must_use]
    pub fn matches(&self, sighting: &Sighting) -> bool {
        let uuid_matches = sighting
            .proximity_uuid
            .as_deref()
            .map_or(true, |uuid| uuid.eq_ignore_ascii_case(&self.proximity_uuid));

        uuid_matches
            && self.major.map_or(true, |major| major == sighting.major)
            && self.minor.map_or(true, |minor| minor == sighting.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sighting(uuid: Option<&str>, major: u16, minor: u16) -> Sighting {
        Sighting {
            identifier: "AA:BB:CC:DD:EE:FF".to_string(),
            proximity_uuid: uuid.map(str::to_string),
            major,
            minor,
            rssi: Some(-60),
            measured_power: Some(-74),
            reported_distance_m: Some(1.0),
        }
    }

    #[test]
    fn test_default_region_matches_any_major() {
        let region = Region::default();
        assert!(region.matches(&sighting(Some(DEFAULT_PROXIMITY_UUID), 6767, 1)));
        assert!(region.matches(&sighting(Some(DEFAULT_PROXIMITY_UUID), 2323, 9)));
    }

    #[test]
    fn test_uuid_match_is_case_insensitive() {
        let region = Region::default();
        assert!(region.matches(&sighting(
            Some("13817C83-7D22-4D5F-9F29-7A54F0AD7FAC"),
            1,
            1
        )));
    }

    #[test]
    fn test_other_uuid_is_rejected() {
        let region = Region::default();
        assert!(!region.matches(&sighting(
            Some("b9407f30-f5f8-466e-aff9-25556b57fe6d"),
            1,
            1
        )));
    }

    #[test]
    fn test_missing_uuid_is_accepted() {
        assert!(Region::default().matches(&sighting(None, 7171, 1)));
    }

    #[test]
    fn test_major_minor_filters() {
        let region = Region {
            major: Some(7171),
            minor: Some(2),
            ..Region::default()
        };
        assert!(region.matches(&sighting(None, 7171, 2)));
        assert!(!region.matches(&sighting(None, 7171, 3)));
        assert!(!region.matches(&sighting(None, 6767, 2)));
    }
}
