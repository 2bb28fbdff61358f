//! Distance accumulation over an ordered stream of parsed points
//!
//! The accumulator is the fold state of a single track: it remembers the previous point
//! and the running distance and duration totals. It is never shared between tracks.

use crate::ParsedLine;
use crate::track::TrackPoint;
use crate::utils::{self, SECONDS_PER_DAY};

/// How a negative time-of-day delta between consecutive points is treated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RolloverPolicy {
    /// Add the raw delta, even when negative. A track crossing midnight ends up
    /// with a corrupted (possibly negative) total duration.
    #[default]
    Raw,
    /// Treat a negative delta as one crossing of midnight and add a full day to it
    WrapMidnight,
}

/// Result of pushing one point into the accumulator
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// The finished point with its segment distance
    pub point: TrackPoint,
    /// Raw time delta from the previous point in seconds (`None` for the first point)
    pub time_delta: Option<i64>,
}

impl Step {
    /// Whether time went backwards between the previous point and this one
    #[inline]
    pub fn went_backwards(&self) -> bool {
        self.time_delta.is_some_and(|delta| delta < 0)
    }
}

/// Running totals of a track
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Totals {
    /// Sum of all segment distances in kilometers
    pub distance_km: f64,
    /// Sum of time deltas in seconds
    pub duration_seconds: i64,
}

/// Fold state carried across the points of one track
#[derive(Clone, Debug, Default)]
pub struct DistanceAccumulator {
    previous: Option<ParsedLine>,
    totals: Totals,
    policy: RolloverPolicy,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl DistanceAccumulator {
    /// Create an empty accumulator
    pub fn new(policy: RolloverPolicy) -> Self {
        Self {
            previous: None,
            totals: Totals::default(),
            policy,
        }
    }

    /// Add the next valid point of the track
    ///
    /// The first point becomes the baseline with a segment distance of 0. Every later
    /// point adds its haversine distance and time delta to the running totals.
    pub fn push(&mut self, current: ParsedLine) -> Step {
        let (segment_distance_km, time_delta) = match self.previous {
            None => (0.0, None),
            Some(previous) => {
                let distance = utils::haversine_km(
                    previous.latitude,
                    previous.longitude,
                    current.latitude,
                    current.longitude,
                );
                let delta = i64::from(current.time_of_day_seconds)
                    - i64::from(previous.time_of_day_seconds);

                self.totals.distance_km += distance;
                self.totals.duration_seconds += self.apply_policy(delta);
                (distance, Some(delta))
            }
        };

        self.previous = Some(current);

        Step {
            point: TrackPoint {
                time_of_day_seconds: current.time_of_day_seconds,
                latitude: current.latitude,
                longitude: current.longitude,
                segment_distance_km,
            },
            time_delta,
        }
    }

    #[inline]
    fn apply_policy(&self, delta: i64) -> i64 {
        match self.policy {
            RolloverPolicy::WrapMidnight if delta < 0 => delta + i64::from(SECONDS_PER_DAY),
            _ => delta,
        }
    }

    /// Running totals so far
    #[inline]
    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Consume the accumulator and return the final totals
    #[inline]
    pub fn finish(self) -> Totals {
        self.totals
    }
}
