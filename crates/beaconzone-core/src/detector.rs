//! Region presence detection with hysteresis.
//!
//! The detector watches the nearest beacon of each batch and turns it into
//! Enter/Leave events. A different beacon only takes over when it is both
//! inside the presence threshold and strictly closer than the tracked one,
//! so jitter around the threshold does not make presence flap.
//!
//! Once a beacon has been entered the detector keeps tracking it, even after
//! it moves out of range and a Leave is emitted. That means a returning
//! beacon with the same group id does not fire a second Enter. Set
//! `reset_on_leave` to go back to the absent state on Leave instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::beacon::{nearest, BeaconObservation};
use crate::config::DetectorConfig;

/// Kind of a region transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegionEventKind {
    /// The beacon's zone was entered.
    Enter,
    /// The beacon's zone was left.
    Leave,
}

/// A single Enter or Leave event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RegionEvent {
    /// Unique event id.
    pub id: Uuid,

    /// Enter or Leave.
    pub kind: RegionEventKind,

    /// Group id (major) of the beacon the event is about.
    pub group_id: u16,

    /// Identifier of the beacon the event is about.
    pub identifier: String,

    /// Distance of that beacon when the event fired.
    pub distance_estimate: Option<f64>,

    /// When the event fired.
    pub occurred_at_utc: DateTime<Utc>,
}

impl RegionEvent {
    fn new(kind: RegionEventKind, beacon: &BeaconObservation) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            group_id: beacon.group_id,
            identifier: beacon.identifier.clone(),
            distance_estimate: beacon.distance_estimate,
            occurred_at_utc: Utc::now(),
        }
    }
}

/// Result of evaluating one batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Nothing happened.
    None,
    /// A zone was entered from the absent state.
    Entered(RegionEvent),
    /// The tracked zone was left.
    Left(RegionEvent),
    /// A closer zone replaced the tracked one.
    Switched {
        /// Leave of the previously tracked zone.
        left: RegionEvent,
        /// Enter of the new zone.
        entered: RegionEvent,
    },
}

impl Transition {
    /// Events in emission order (Leave before Enter).
    #[must_use]
    pub fn into_events(self) -> Vec<RegionEvent> {
        match self {
            Self::None => Vec::new(),
            Self::Entered(event) | Self::Left(event) => vec![event],
            Self::Switched { left, entered } => vec![left, entered],
        }
    }

    /// Whether no event was produced.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Coarse tracking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    /// No beacon has been entered (or the last one was left with reset).
    Absent,
    /// A beacon is being tracked.
    Tracking,
}

/// Stateful Enter/Leave filter for one region.
#[derive(Debug, Clone)]
pub struct RegionTransitionDetector {
    presence_threshold: f64,
    reset_on_leave: bool,
    tracked: Option<BeaconObservation>,
    inside: bool,
}

impl RegionTransitionDetector {
    /// Create a detector in the absent state.
    #[must_use]
    pub const fn new(presence_threshold: f64) -> Self {
        Self {
            presence_threshold,
            reset_on_leave: false,
            tracked: None,
            inside: false,
        }
    }

    /// Create a detector from configuration.
    #[must_use]
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.presence_threshold).with_reset_on_leave(config.reset_on_leave)
    }

    /// Clear tracking on Leave instead of keeping the left beacon.
    #[must_use]
    pub fn with_reset_on_leave(mut self, reset_on_leave: bool) -> Self {
        self.reset_on_leave = reset_on_leave;
        self
    }

    /// The presence threshold in meters.
    #[must_use]
    pub const fn presence_threshold(&self) -> f64 {
        self.presence_threshold
    }

    /// The beacon currently tracked, if any.
    #[must_use]
    pub const fn tracked(&self) -> Option<&BeaconObservation> {
        self.tracked.as_ref()
    }

    /// Absent or tracking.
    #[must_use]
    pub const fn state(&self) -> TrackingState {
        if self.tracked.is_some() {
            TrackingState::Tracking
        } else {
            TrackingState::Absent
        }
    }

    /// Whether the last emitted event was an Enter.
    #[must_use]
    pub const fn is_inside(&self) -> bool {
        self.inside
    }

    /// Evaluate a batch of observations; an empty batch never transitions.
    pub fn observe_batch(&mut self, batch: &[BeaconObservation]) -> Transition {
        match nearest(batch) {
            Some(closest) => self.evaluate(closest),
            None => Transition::None,
        }
    }

    /// Evaluate the nearest beacon of the current batch.
    pub fn evaluate(&mut self, nearest: &BeaconObservation) -> Transition {
        let distance = nearest.effective_distance();
        let within = distance <= self.presence_threshold;

        let Some(tracked) = self.tracked.as_ref() else {
            if !within {
                debug!(
                    identifier = %nearest.identifier,
                    distance = ?nearest.distance_estimate,
                    "Nearest beacon outside presence threshold"
                );
                return Transition::None;
            }
            let entered = RegionEvent::new(RegionEventKind::Enter, nearest);
            self.track(nearest.clone(), true);
            info!(group_id = entered.group_id, identifier = %entered.identifier, "Entered region");
            return Transition::Entered(entered);
        };

        if nearest.group_id != tracked.group_id {
            if distance < tracked.effective_distance() && within {
                let left = RegionEvent::new(RegionEventKind::Leave, tracked);
                let entered = RegionEvent::new(RegionEventKind::Enter, nearest);
                info!(
                    from_group = left.group_id,
                    to_group = entered.group_id,
                    "Switched region"
                );
                self.track(nearest.clone(), true);
                return Transition::Switched { left, entered };
            }
            debug!(
                tracked_group = tracked.group_id,
                nearest_group = nearest.group_id,
                "Competing beacon not close enough to take over"
            );
            return Transition::None;
        }

        if within {
            self.tracked = Some(nearest.clone());
            return Transition::None;
        }

        let left = RegionEvent::new(RegionEventKind::Leave, nearest);
        info!(group_id = left.group_id, identifier = %left.identifier, "Left region");
        if self.reset_on_leave {
            self.tracked = None;
            self.inside = false;
        } else {
            self.track(nearest.clone(), false);
        }
        Transition::Left(left)
    }

    fn track(&mut self, beacon: BeaconObservation, inside: bool) {
        self.tracked = Some(beacon);
        self.inside = inside;
    }
}
