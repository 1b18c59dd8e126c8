//! Deduplicated, proximity-ordered view of every beacon seen this session.
//!
//! Beacons are never evicted: an identifier missing from a later batch keeps
//! its last observation.

use std::collections::HashMap;

use tracing::debug;

use crate::beacon::{proximity_order, BeaconObservation};

/// Merges scan batches into one ordered collection keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct BeaconRegistry {
    entries: Vec<BeaconObservation>,
    /// Identifier to position in `entries`, rebuilt after every sort.
    index: HashMap<String, usize>,
    revision: u64,
}

impl BeaconRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch and return the re-sorted collection.
    ///
    /// Known identifiers are replaced wholesale, unknown ones are appended.
    /// An empty batch still re-sorts and bumps the revision.
    pub fn merge<I>(&mut self, batch: I) -> &[BeaconObservation]
    where
        I: IntoIterator<Item = BeaconObservation>,
    {
        let mut replaced = 0usize;
        let mut inserted = 0usize;

        for observation in batch {
            match self.index.get(&observation.identifier) {
                Some(&i) => {
                    self.entries[i] = observation;
                    replaced += 1;
                }
                None => {
                    self.index
                        .insert(observation.identifier.clone(), self.entries.len());
                    self.entries.push(observation);
                    inserted += 1;
                }
            }
        }

        self.entries.sort_by(proximity_order);
        self.reindex();
        self.revision += 1;

        debug!(
            revision = self.revision,
            replaced,
            inserted,
            total = self.entries.len(),
            "Merged beacon batch"
        );

        &self.entries
    }

    /// The ordered collection.
    #[must_use]
    pub fn ordered(&self) -> &[BeaconObservation] {
        &self.entries
    }

    /// Look up the stored observation for an identifier.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&BeaconObservation> {
        self.index.get(identifier).map(|&i| &self.entries[i])
    }

    /// Number of distinct beacons seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no beacon has been seen yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of merges performed, including empty ones.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, entry) in self.entries.iter().enumerate() {
            self.index.insert(entry.identifier.clone(), i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon::test_support::{observation, unranged};
    use crate::beacon::ProximityRank;

    fn identifiers(registry: &BeaconRegistry) -> Vec<&str> {
        registry
            .ordered()
            .iter()
            .map(|o| o.identifier.as_str())
            .collect()
    }

    #[test]
    fn test_merge_sorts_by_rank_then_distance() {
        let mut registry = BeaconRegistry::new();
        registry.merge(vec![
            observation("far", 1, 8.0),
            observation("immediate", 2, 0.1),
            observation("near", 3, 2.0),
        ]);
        assert_eq!(identifiers(&registry), vec!["immediate", "near", "far"]);
    }

    #[test]
    fn test_merge_replaces_existing_entry() {
        let mut registry = BeaconRegistry::new();
        registry.merge(vec![observation("AA", 1, 8.0), observation("BB", 2, 2.0)]);
        registry.merge(vec![observation("AA", 1, 0.2)]);

        assert_eq!(registry.len(), 2);
        assert_eq!(identifiers(&registry), vec!["AA", "BB"]);
        let aa = registry.get("AA").unwrap();
        assert_eq!(aa.distance_estimate, Some(0.2));
        assert_eq!(aa.proximity_rank, ProximityRank::Immediate);
    }

    #[test]
    fn test_lookup_follows_reordering() {
        let mut registry = BeaconRegistry::new();
        registry.merge(vec![observation("AA", 1, 0.2), observation("BB", 2, 2.0)]);
        registry.merge(vec![observation("AA", 1, 9.0), observation("CC", 3, 0.1)]);

        assert_eq!(identifiers(&registry), vec!["CC", "BB", "AA"]);
        assert_eq!(registry.get("AA").unwrap().distance_estimate, Some(9.0));
        assert_eq!(registry.get("BB").unwrap().group_id, 2);
        assert_eq!(registry.get("CC").unwrap().group_id, 3);
        assert!(registry.get("DD").is_none());
    }

    #[test]
    fn test_repeated_identifier_in_one_batch_keeps_last() {
        let mut registry = BeaconRegistry::new();
        registry.merge(vec![observation("AA", 1, 5.0), observation("AA", 1, 1.5)]);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("AA").unwrap().distance_estimate, Some(1.5));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let batch = vec![
            observation("AA", 1, 2.5),
            observation("BB", 2, 2.5),
            unranged("CC", 3),
        ];

        let mut once = BeaconRegistry::new();
        once.merge(batch.clone());

        let mut twice = BeaconRegistry::new();
        twice.merge(batch.clone());
        twice.merge(batch);

        assert_eq!(once.ordered(), twice.ordered());
    }

    #[test]
    fn test_membership_is_monotonic() {
        let mut registry = BeaconRegistry::new();
        registry.merge(vec![observation("AA", 1, 1.0), observation("BB", 2, 2.0)]);
        registry.merge(vec![observation("CC", 3, 0.3)]);

        for id in ["AA", "BB", "CC"] {
            assert!(registry.get(id).is_some(), "{id} should still be registered");
        }
        assert_eq!(identifiers(&registry), vec!["CC", "AA", "BB"]);
    }

    #[test]
    fn test_ordering_respects_rank_for_every_pair() {
        let mut registry = BeaconRegistry::new();
        registry.merge(vec![
            unranged("u1", 9),
            observation("f1", 1, 12.0),
            observation("n1", 2, 1.1),
            observation("i1", 3, 0.4),
            observation("n2", 4, 2.9),
        ]);

        let ordered = registry.ordered();
        for (i, a) in ordered.iter().enumerate() {
            for b in &ordered[i + 1..] {
                assert!(a.proximity_rank <= b.proximity_rank);
            }
        }
        assert_eq!(ordered.last().unwrap().identifier, "u1");
    }

    #[test]
    fn test_empty_batch_keeps_order_and_bumps_revision() {
        let mut registry = BeaconRegistry::new();
        registry.merge(vec![observation("AA", 1, 3.0), observation("BB", 2, 1.0)]);
        let before = registry.ordered().to_vec();

        let after = registry.merge(Vec::new()).to_vec();

        assert_eq!(before, after);
        assert_eq!(registry.revision(), 2);
    }
}
