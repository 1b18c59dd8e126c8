//! Ranging sessions: one region, one registry, one detector.
//!
//! [`RangingSession::process_batch`] is the single entry point per scan
//! batch. It is not internally synchronised; drive it from one sequential
//! source or hold one lock around the whole call.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::beacon::{BeaconObservation, ProximityEstimator, ReportedEstimator, Sighting};
use crate::config::DetectorConfig;
use crate::detector::{RegionEvent, RegionTransitionDetector};
use crate::region::Region;
use crate::registry::BeaconRegistry;

/// Consumer of registry updates and region events.
pub trait EventSink {
    /// Called after every merge with the full ordered collection.
    fn on_registry_changed(&self, region: &Region, ordered: &[BeaconObservation]);

    /// Called once per emitted event, Leave before Enter.
    fn on_region_event(&self, region: &Region, event: RegionEvent);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_registry_changed(&self, _region: &Region, _ordered: &[BeaconObservation]) {}

    fn on_region_event(&self, _region: &Region, _event: RegionEvent) {}
}

/// What one batch produced.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// Observations accepted from the batch after region filtering.
    pub accepted: usize,
    /// Sightings dropped because they were outside the region.
    pub filtered: usize,
    /// Registry size after the merge.
    pub registry_len: usize,
    /// Events emitted, in order.
    pub events: Vec<RegionEvent>,
}

/// Registry and detector for one region.
#[derive(Debug, Clone)]
pub struct RangingSession<E = ReportedEstimator> {
    region: Region,
    registry: BeaconRegistry,
    detector: RegionTransitionDetector,
    estimator: E,
}

impl RangingSession<ReportedEstimator> {
    /// Session using provider-reported distances.
    #[must_use]
    pub fn new(region: Region, detector: &DetectorConfig) -> Self {
        Self::with_estimator(region, detector, ReportedEstimator)
    }
}

impl<E: ProximityEstimator> RangingSession<E> {
    /// Session with a custom estimator.
    #[must_use]
    pub fn with_estimator(region: Region, detector: &DetectorConfig, estimator: E) -> Self {
        Self {
            region,
            registry: BeaconRegistry::new(),
            detector: RegionTransitionDetector::from_config(detector),
            estimator,
        }
    }

    /// The region this session ranges.
    #[must_use]
    pub const fn region(&self) -> &Region {
        &self.region
    }

    /// The beacon registry.
    #[must_use]
    pub const fn registry(&self) -> &BeaconRegistry {
        &self.registry
    }

    /// The region detector.
    #[must_use]
    pub const fn detector(&self) -> &RegionTransitionDetector {
        &self.detector
    }

    /// Merge one scan batch and evaluate presence.
    ///
    /// Sightings outside the region are dropped; repeated identifiers within
    /// the batch keep the last sighting. The sink always hears about the
    /// merge, and hears about events only when the batch had beacons.
    #[instrument(skip_all, fields(region = %self.region.id, size = batch.len()))]
    pub fn process_batch(&mut self, batch: Vec<Sighting>, sink: &dyn EventSink) -> BatchOutcome {
        let total = batch.len();
        let observations = self.observations_in_region(batch);
        let accepted = observations.len();
        let filtered = total - accepted;
        if filtered > 0 {
            debug!(filtered, "Dropped sightings outside region");
        }

        let transition = self.detector.observe_batch(&observations);

        let ordered = self.registry.merge(observations);
        sink.on_registry_changed(&self.region, ordered);
        let registry_len = ordered.len();

        let events = transition.into_events();
        for event in &events {
            sink.on_region_event(&self.region, event.clone());
        }

        BatchOutcome {
            accepted,
            filtered,
            registry_len,
            events,
        }
    }

    fn observations_in_region(&self, batch: Vec<Sighting>) -> Vec<BeaconObservation> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut observations: Vec<BeaconObservation> = Vec::with_capacity(batch.len());

        for sighting in batch.into_iter().filter(|s| self.region.matches(s)) {
            let observation = BeaconObservation::from_sighting(sighting, &self.estimator);
            match index.get(&observation.identifier) {
                Some(&i) => observations[i] = observation,
                None => {
                    index.insert(observation.identifier.clone(), observations.len());
                    observations.push(observation);
                }
            }
        }

        observations
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::beacon::ProximityRank;
    use crate::detector::{RegionEventKind, TrackingState};
    use crate::region::DEFAULT_PROXIMITY_UUID;

    #[derive(Default)]
    struct RecordingSink {
        snapshots: RefCell<Vec<Vec<String>>>,
        events: RefCell<Vec<(RegionEventKind, u16)>>,
    }

    impl EventSink for RecordingSink {
        fn on_registry_changed(&self, _region: &Region, ordered: &[BeaconObservation]) {
            self.snapshots
                .borrow_mut()
                .push(ordered.iter().map(|o| o.identifier.clone()).collect());
        }

        fn on_region_event(&self, _region: &Region, event: RegionEvent) {
            self.events.borrow_mut().push((event.kind, event.group_id));
        }
    }

    fn sighting(identifier: &str, major: u16, distance: f64) -> Sighting {
        Sighting {
            identifier: identifier.to_string(),
            proximity_uuid: Some(DEFAULT_PROXIMITY_UUID.to_string()),
            major,
            minor: 1,
            rssi: Some(-65),
            measured_power: Some(-74),
            reported_distance_m: Some(distance),
        }
    }

    fn session() -> RangingSession {
        RangingSession::new(Region::default(), &DetectorConfig::default())
    }

    #[test]
    fn test_hysteresis_through_session() {
        let mut session = session();
        let sink = RecordingSink::default();

        for distance in [5.0, 3.0, 3.5, 4.5] {
            session.process_batch(vec![sighting("X", 6767, distance)], &sink);
        }

        assert_eq!(
            *sink.events.borrow(),
            vec![(RegionEventKind::Enter, 6767), (RegionEventKind::Leave, 6767)]
        );
        assert_eq!(sink.snapshots.borrow().len(), 4);
    }

    #[test]
    fn test_switch_emits_leave_then_enter() {
        let mut session = session();
        let sink = RecordingSink::default();

        session.process_batch(vec![sighting("X", 6767, 2.0)], &sink);
        let outcome = session.process_batch(vec![sighting("Y", 7171, 1.0)], &sink);

        assert_eq!(outcome.events.len(), 2);
        assert_eq!(
            *sink.events.borrow(),
            vec![
                (RegionEventKind::Enter, 6767),
                (RegionEventKind::Leave, 6767),
                (RegionEventKind::Enter, 7171),
            ]
        );
        assert_eq!(outcome.registry_len, 2);
    }

    #[test]
    fn test_nearest_comes_from_current_batch() {
        let mut session = session();
        let sink = RecordingSink::default();

        session.process_batch(vec![sighting("X", 6767, 1.0)], &sink);
        // X stays in the registry at 1.0 but is not part of this batch.
        let outcome = session.process_batch(vec![sighting("Y", 7171, 9.0)], &sink);

        assert!(outcome.events.is_empty());
        assert_eq!(session.detector().tracked().unwrap().identifier, "X");
        assert_eq!(sink.snapshots.borrow()[1], vec!["X", "Y"]);
    }

    #[test]
    fn test_empty_batch_notifies_registry_only() {
        let mut session = session();
        let sink = RecordingSink::default();

        session.process_batch(vec![sighting("X", 6767, 2.0)], &sink);
        let outcome = session.process_batch(Vec::new(), &sink);

        assert!(outcome.events.is_empty());
        assert_eq!(sink.snapshots.borrow().len(), 2);
        assert_eq!(sink.snapshots.borrow()[1], vec!["X"]);
        assert_eq!(sink.events.borrow().len(), 1);
    }

    #[test]
    fn test_out_of_region_sightings_are_dropped() {
        let mut session = session();
        let mut foreign = sighting("Z", 6767, 0.5);
        foreign.proximity_uuid = Some("b9407f30-f5f8-466e-aff9-25556b57fe6d".to_string());

        let outcome = session.process_batch(vec![foreign], &NullSink);

        assert_eq!(outcome.filtered, 1);
        assert_eq!(outcome.accepted, 0);
        assert!(session.registry().is_empty());
        assert_eq!(session.detector().state(), TrackingState::Absent);
    }

    #[test]
    fn test_duplicate_identifier_in_batch_keeps_last() {
        let mut session = session();
        let outcome = session.process_batch(
            vec![sighting("X", 6767, 9.0), sighting("X", 6767, 0.3)],
            &NullSink,
        );

        assert_eq!(outcome.accepted, 1);
        let stored = session.registry().get("X").unwrap();
        assert_eq!(stored.distance_estimate, Some(0.3));
        assert_eq!(stored.proximity_rank, ProximityRank::Immediate);
        assert_eq!(outcome.events.len(), 1);
    }

    #[test]
    fn test_invalid_observation_is_listed_but_never_enters() {
        let mut session = session();
        let mut invalid = sighting("X", 6767, 0.2);
        invalid.measured_power = None;

        let outcome = session.process_batch(vec![invalid], &NullSink);

        assert!(outcome.events.is_empty());
        assert_eq!(session.registry().len(), 1);
        assert_eq!(session.detector().state(), TrackingState::Absent);
    }

    #[test]
    fn test_custom_estimator() {
        struct Fixed;
        impl ProximityEstimator for Fixed {
            fn distance_estimate(&self, _sighting: &Sighting) -> Option<f64> {
                Some(0.1)
            }
            fn proximity_rank(&self, _sighting: &Sighting) -> ProximityRank {
                ProximityRank::Immediate
            }
        }

        let mut session =
            RangingSession::with_estimator(Region::default(), &DetectorConfig::default(), Fixed);
        let outcome = session.process_batch(vec![sighting("X", 6767, 50.0)], &NullSink);
        assert_eq!(outcome.events.len(), 1);
    }
}
