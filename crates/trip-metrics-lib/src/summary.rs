//! Trip-level metrics derived from the accumulated totals

use crate::Totals;
use crate::utils::{format_duration, round2};

/// Distance in kilometers covered per fuel unit, modeling a motorbike
pub const DEFAULT_FUEL_ECONOMY_KM_PER_UNIT: f64 = 50.4;

/// Summary metrics of one track
///
/// All values are derived from the point sequence of the track and recomputed for
/// every pipeline run. Use [`TrackSummary::rounded`] for display.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackSummary {
    /// Total distance in kilometers
    pub total_distance_km: f64,
    /// Total elapsed time in seconds
    pub total_duration_seconds: i64,
    /// Average speed in km/h, 0 when no time elapsed
    pub average_speed_kmh: f64,
    /// Estimated fuel consumption
    pub fuel_consumption_units: f64,
    /// Duration rendered as `"{H}h {M}m {S}s"`
    pub formatted_duration: String,
}

impl Default for TrackSummary {
    fn default() -> Self {
        Self::from_totals(&Totals::default(), DEFAULT_FUEL_ECONOMY_KM_PER_UNIT)
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl TrackSummary {
    /// Compute the summary from running totals
    ///
    /// # Arguments
    /// * `totals` - Distance and duration accumulated over the track
    /// * `fuel_economy_km_per_unit` - Kilometers traveled per unit of fuel
    pub fn from_totals(totals: &Totals, fuel_economy_km_per_unit: f64) -> Self {
        let total_distance_km = totals.distance_km;
        let total_duration_seconds = totals.duration_seconds;

        let average_speed_kmh = if total_duration_seconds > 0 {
            total_distance_km / (total_duration_seconds as f64 / 3600.0)
        } else {
            0.0
        };

        Self {
            total_distance_km,
            total_duration_seconds,
            average_speed_kmh,
            fuel_consumption_units: total_distance_km / fuel_economy_km_per_unit,
            formatted_duration: format_duration(total_duration_seconds),
        }
    }

    /// Copy of this summary with distance, speed and fuel rounded to 2 decimals
    pub fn rounded(&self) -> Self {
        Self {
            total_distance_km: round2(self.total_distance_km),
            total_duration_seconds: self.total_duration_seconds,
            average_speed_kmh: round2(self.average_speed_kmh),
            fuel_consumption_units: round2(self.fuel_consumption_units),
            formatted_duration: self.formatted_duration.clone(),
        }
    }

    /// Whether the track had no movement and no elapsed time
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.total_distance_km == 0.0 && self.total_duration_seconds == 0
    }
}
