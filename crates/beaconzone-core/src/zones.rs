//! Human-facing zone names and notification messages keyed by group id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::detector::RegionEventKind;

/// Name shown for a group id with no configured zone.
pub const UNKNOWN_ZONE_NAME: &str = "Unknown";

/// Message used for Enter/Leave of a group id with no configured zone.
pub const UNKNOWN_PLACE_MESSAGE: &str = "Unknown place";

/// Display name and messages for one group id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "group_id": 7171,
    "name": "Meeting room",
    "enter_message": "Entering into Arzion meeting room",
    "leave_message": "Leaving the Arzion meeting room."
}))]
pub struct Zone {
    /// Beacon group id (major).
    pub group_id: u16,

    /// Display name.
    pub name: String,

    /// Message posted on Enter.
    pub enter_message: String,

    /// Message posted on Leave.
    pub leave_message: String,
}

impl Zone {
    fn new(group_id: u16, name: &str, enter_message: &str, leave_message: &str) -> Self {
        Self {
            group_id,
            name: name.to_string(),
            enter_message: enter_message.to_string(),
            leave_message: leave_message.to_string(),
        }
    }
}

/// The zones shipped with a fresh configuration.
#[must_use]
pub fn default_zones() -> Vec<Zone> {
    vec![
        Zone::new(
            6767,
            "Mobile Island",
            "Entering into the Mobile island.",
            "Leaving the Mobile island.",
        ),
        Zone::new(
            7171,
            "Meeting room",
            "Entering into Arzion meeting room",
            "Leaving the Arzion meeting room.",
        ),
        Zone::new(
            2323,
            "Lunch court",
            "Entering into the Arzion food court. Dont feed the zombie!",
            "Leaving the Arzion food court. Don't feed the zombie!",
        ),
    ]
}

/// Lookup table from group id to zone.
#[derive(Debug, Clone, Default)]
pub struct ZoneDirectory {
    zones: BTreeMap<u16, Zone>,
}

impl ZoneDirectory {
    /// Build a directory; later entries win on duplicate group ids.
    #[must_use]
    pub fn new(zones: impl IntoIterator<Item = Zone>) -> Self {
        Self {
            zones: zones.into_iter().map(|z| (z.group_id, z)).collect(),
        }
    }

    /// Zone for a group id.
    #[must_use]
    pub fn get(&self, group_id: u16) -> Option<&Zone> {
        self.zones.get(&group_id)
    }

    /// Display name for a group id.
    #[must_use]
    pub fn name(&self, group_id: u16) -> &str {
        self.get(group_id).map_or(UNKNOWN_ZONE_NAME, |z| z.name.as_str())
    }

    /// Notification text for an event on a group id.
    #[must_use]
    pub fn message(&self, group_id: u16, kind: RegionEventKind) -> &str {
        self.get(group_id).map_or(UNKNOWN_PLACE_MESSAGE, |z| match kind {
            RegionEventKind::Enter => z.enter_message.as_str(),
            RegionEventKind::Leave => z.leave_message.as_str(),
        })
    }

    /// All zones ordered by group id.
    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }
}
