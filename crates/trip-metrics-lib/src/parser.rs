//! Line parser for raw GPS log records
//!
//! Each record has the shape `<timestamp>,{"lat":<n>,"lon":<n>}` where the timestamp
//! contains a literal `T` before an `HH:MM:SS` time of day. Anything after the first `.`
//! of the time (sub-seconds, zone marker) is ignored.

use crate::utils::SECONDS_PER_DAY;
use once_cell::sync::Lazy;
use regex::Regex;

/// Coordinate object pattern. Only unsigned decimals are accepted.
static COORDINATES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\{"lat":([0-9.]+),"lon":([0-9.]+)\}"#).expect("coordinate pattern is valid")
});

/// A successfully parsed log line
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedLine {
    /// Seconds since midnight, in `[0, 86399]`
    pub time_of_day_seconds: u32,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

/// Reason a log line was skipped
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseError {
    #[error("no comma between timestamp and coordinates")]
    MissingComma,

    #[error("timestamp has no 'T' date/time separator")]
    MissingTimeSeparator,

    #[error("malformed time of day: {0:?}")]
    InvalidTime(String),

    #[error("time of day out of range")]
    TimeOutOfRange,

    #[error("no {{\"lat\":..,\"lon\":..}} coordinate object")]
    MissingCoordinates,

    #[error("malformed coordinate: {0:?}")]
    InvalidCoordinate(String),
}

/// Parse one raw log line
///
/// Never panics; every malformed input maps to a [`ParseError`].
pub fn parse_line(line: &str) -> Result<ParsedLine, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);

    let (timestamp, coordinates) = line.split_once(',').ok_or(ParseError::MissingComma)?;
    let time_of_day_seconds = parse_time_of_day(timestamp)?;
    let (latitude, longitude) = parse_coordinates(coordinates)?;

    Ok(ParsedLine {
        time_of_day_seconds,
        latitude,
        longitude,
    })
}

/// Extract `HH:MM:SS` from an ISO 8601-like timestamp as seconds since midnight
fn parse_time_of_day(timestamp: &str) -> Result<u32, ParseError> {
    let time = timestamp
        .split('T')
        .nth(1)
        .ok_or(ParseError::MissingTimeSeparator)?;
    let time = time.split('.').next().unwrap_or(time);

    let mut components = [0u32; 3];
    let mut count = 0;
    for part in time.split(':') {
        if count == components.len() || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ParseError::InvalidTime(time.to_string()));
        }
        components[count] = part
            .parse()
            .map_err(|_| ParseError::InvalidTime(time.to_string()))?;
        count += 1;
    }
    if count != components.len() {
        return Err(ParseError::InvalidTime(time.to_string()));
    }

    let [hours, minutes, seconds] = components;
    if minutes >= 60 || seconds >= 60 {
        return Err(ParseError::TimeOutOfRange);
    }
    let total = hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes * 60 + seconds))
        .filter(|&total| total < SECONDS_PER_DAY)
        .ok_or(ParseError::TimeOutOfRange)?;

    Ok(total)
}

/// Find the coordinate object and parse both numbers
fn parse_coordinates(segment: &str) -> Result<(f64, f64), ParseError> {
    let captures = COORDINATES
        .captures(segment)
        .ok_or(ParseError::MissingCoordinates)?;

    let parse = |index: usize| -> Result<f64, ParseError> {
        let text = captures.get(index).map_or("", |m| m.as_str());
        text.parse::<f64>()
            .map_err(|_| ParseError::InvalidCoordinate(text.to_string()))
    };

    Ok((parse(1)?, parse(2)?))
}
