//! Utility functions for geodesic distance, rounding and time formatting

/// Mean Earth radius in kilometers used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Number of seconds in one day, the period of a time-of-day value
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Great-circle distance between two WGS84 positions in kilometers
///
/// # Arguments
/// * `lat1`, `lon1` - First position in degrees
/// * `lat2`, `lon2` - Second position in degrees
///
/// Uses `atan2` rather than `asin` so the result stays stable near antipodal points.
#[inline]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Round a value to 2 decimal places for display
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a duration in seconds as `"{H}h {M}m {S}s"` without zero padding
///
/// Uses floor division, so a negative total (possible after a midnight rollover)
/// renders as e.g. `"-1h 59m 55s"` for `-5`.
pub fn format_duration(total_seconds: i64) -> String {
    let hours = total_seconds.div_euclid(3600);
    let minutes = total_seconds.rem_euclid(3600) / 60;
    let seconds = total_seconds.rem_euclid(60);
    format!("{hours}h {minutes}m {seconds}s")
}

/// Format seconds since midnight as `HH:MM:SS`
pub fn format_time_of_day(seconds: u32) -> String {
    let seconds = seconds % SECONDS_PER_DAY;
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
