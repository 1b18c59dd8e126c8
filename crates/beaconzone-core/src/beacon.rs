//! Beacon sightings, derived observations and the proximity estimation seam.
//!
//! A [`Sighting`] is what the external scanner reports. Turning it into a
//! [`BeaconObservation`] needs a distance estimate and a proximity rank,
//! which come from a [`ProximityEstimator`]. Signal-to-distance physics is
//! not done here; [`ReportedEstimator`] trusts the distance the ranging
//! provider already computed.

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;
use utoipa::ToSchema;

/// Upper bound (exclusive) of the immediate proximity bucket, in meters.
pub const IMMEDIATE_MAX_METERS: f64 = 0.5;

/// Upper bound (inclusive) of the near proximity bucket, in meters.
pub const NEAR_MAX_METERS: f64 = 3.0;

/// Coarse proximity category, ordered nearest first.
///
/// `Unknown` sorts after every real category so that beacons without a
/// usable reading never precede beacons with one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ProximityRank {
    /// Within half a meter.
    Immediate,
    /// Within a few meters.
    Near,
    /// Further away than near.
    Far,
    /// No usable distance.
    Unknown,
}

impl ProximityRank {
    /// Buckets a distance estimate into a rank.
    #[must_use]
    pub fn from_distance(distance_m: Option<f64>) -> Self {
        match distance_m {
            Some(d) if !d.is_finite() || d < 0.0 => Self::Unknown,
            Some(d) if d < IMMEDIATE_MAX_METERS => Self::Immediate,
            Some(d) if d <= NEAR_MAX_METERS => Self::Near,
            Some(_) => Self::Far,
            None => Self::Unknown,
        }
    }
}

/// A raw beacon sighting as delivered by the scanner in one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "identifier": "D3:5F:2A:8B:11:C0",
    "proximity_uuid": "13817c83-7d22-4d5f-9f29-7a54f0ad7fac",
    "major": 6767,
    "minor": 1,
    "rssi": -67,
    "measured_power": -74,
    "reported_distance_m": 1.8
}))]
pub struct Sighting {
    /// Hardware address of the beacon.
    #[schema(example = "D3:5F:2A:8B:11:C0")]
    pub identifier: String,

    /// Proximity UUID advertised by the beacon, if the scanner reports it.
    #[serde(default)]
    pub proximity_uuid: Option<String>,

    /// Major value (logical zone).
    pub major: u16,

    /// Minor value.
    pub minor: u16,

    /// Received signal strength in dBm. Non-numeric input reads as missing.
    #[serde(default, deserialize_with = "lenient_dbm")]
    pub rssi: Option<i16>,

    /// Calibrated transmit power at one meter, in dBm.
    #[serde(default, deserialize_with = "lenient_dbm")]
    pub measured_power: Option<i16>,

    /// Distance already estimated by the ranging provider, in meters.
    #[serde(default, deserialize_with = "lenient_meters")]
    pub reported_distance_m: Option<f64>,
}

/// Reads a dBm value, mapping anything that is not an in-range integer to `None`.
fn lenient_dbm<'de, D>(deserializer: D) -> Result<Option<i16>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_i64().and_then(|v| i16::try_from(v).ok()))
}

fn lenient_meters<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

impl Sighting {
    /// Whether both signal strength and reference power are present.
    #[must_use]
    pub const fn has_signal(&self) -> bool {
        self.rssi.is_some() && self.measured_power.is_some()
    }
}

/// Source of distance estimates and proximity ranks for sightings.
pub trait ProximityEstimator {
    /// Distance in meters, or `None` when no estimate is possible.
    fn distance_estimate(&self, sighting: &Sighting) -> Option<f64>;

    /// Coarse proximity rank used for ordering.
    fn proximity_rank(&self, sighting: &Sighting) -> ProximityRank;
}

/// Estimator that uses the distance reported alongside each sighting.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportedEstimator;

impl ProximityEstimator for ReportedEstimator {
    fn distance_estimate(&self, sighting: &Sighting) -> Option<f64> {
        sighting
            .reported_distance_m
            .filter(|d| d.is_finite() && *d >= 0.0)
    }

    fn proximity_rank(&self, sighting: &Sighting) -> ProximityRank {
        ProximityRank::from_distance(self.distance_estimate(sighting))
    }
}

/// One beacon sighting with its derived distance and rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BeaconObservation {
    /// Stable key of the beacon (hardware address).
    pub identifier: String,

    /// Proximity UUID, when known.
    pub proximity_uuid: Option<String>,

    /// Logical zone identifier (major).
    pub group_id: u16,

    /// Minor identifier.
    pub sub_id: u16,

    /// Received signal strength in dBm.
    pub signal_strength: Option<i16>,

    /// Calibrated transmit power in dBm.
    pub reference_power: Option<i16>,

    /// Distance estimate in meters; `None` when the reading is invalid.
    pub distance_estimate: Option<f64>,

    /// Coarse proximity rank.
    pub proximity_rank: ProximityRank,
}

impl BeaconObservation {
    /// Derives an observation from a sighting.
    ///
    /// A sighting without signal strength or reference power is still turned
    /// into an observation so it stays visible, but with an undefined
    /// distance and an `Unknown` rank.
    pub fn from_sighting<E>(sighting: Sighting, estimator: &E) -> Self
    where
        E: ProximityEstimator + ?Sized,
    {
        let (distance_estimate, proximity_rank) = if sighting.has_signal() {
            let distance = estimator
                .distance_estimate(&sighting)
                .filter(|d| d.is_finite() && *d >= 0.0);
            let rank = if distance.is_some() {
                estimator.proximity_rank(&sighting)
            } else {
                ProximityRank::Unknown
            };
            (distance, rank)
        } else {
            warn!(
                identifier = %sighting.identifier,
                rssi = ?sighting.rssi,
                measured_power = ?sighting.measured_power,
                "Invalid observation: missing signal strength or reference power"
            );
            (None, ProximityRank::Unknown)
        };

        Self {
            identifier: sighting.identifier,
            proximity_uuid: sighting.proximity_uuid,
            group_id: sighting.major,
            sub_id: sighting.minor,
            signal_strength: sighting.rssi,
            reference_power: sighting.measured_power,
            distance_estimate,
            proximity_rank,
        }
    }

    /// Distance used for comparisons: undefined distances count as infinitely far.
    #[must_use]
    pub fn effective_distance(&self) -> f64 {
        self.distance_estimate.unwrap_or(f64::INFINITY)
    }

    /// Whether the observation carries a usable distance.
    #[must_use]
    pub const fn is_ranged(&self) -> bool {
        self.distance_estimate.is_some()
    }
}

/// Total order used everywhere beacons are sorted: rank, then distance,
/// then identifier.
#[must_use]
pub fn proximity_order(a: &BeaconObservation, b: &BeaconObservation) -> Ordering {
    a.proximity_rank
        .cmp(&b.proximity_rank)
        .then_with(|| a.effective_distance().total_cmp(&b.effective_distance()))
        .then_with(|| a.identifier.cmp(&b.identifier))
}

/// The closest observation of a batch, if any.
#[must_use]
pub fn nearest(batch: &[BeaconObservation]) -> Option<&BeaconObservation> {
    batch.iter().min_by(|a, b| proximity_order(a, b))
}
