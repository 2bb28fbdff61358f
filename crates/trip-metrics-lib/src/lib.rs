//! Trip Metrics Library - GPS Log Analytics
//!
//! This library turns raw GPS location logs into per-trip summary metrics: distance traveled,
//! elapsed time, average speed and an estimated fuel consumption. Each log is a finite sequence
//! of lines of the form
//!
//! ```text
//! 2024-01-01T10:00:00.000Z,{"lat":10.0,"lon":20.0}
//! ```
//!
//! # Architecture
//!
//! - **[`parse_line`]**: Tolerant line parser producing a [`ParsedLine`] or a [`ParseError`]
//! - **[`DistanceAccumulator`]**: Fold over the point stream with haversine segment distances
//! - **[`TrackSummary`]**: Trip-level totals derived from the accumulated distance and time
//! - **[`Track`]**: One processed log with its points, summary and line diagnostics
//! - **[`TrackCollection`]**: Independent processing of many logs with positional results
//!
//! # Pipeline
//!
//! ```text
//! raw lines -> parse_line -> DistanceAccumulator -> TrackSummary -> Track
//! ```
//!
//! Malformed lines never abort a log; they are dropped and recorded as [`LineDiagnostic`]s.

mod accumulator;
mod collection;
mod parser;
mod summary;
mod track;
pub mod utils;

// Public API exports
pub use accumulator::{DistanceAccumulator, RolloverPolicy, Step, Totals};
pub use collection::{CollectionInfo, Config, TrackCollection, TrackColumns};
pub use parser::{ParseError, ParsedLine, parse_line};
pub use summary::{DEFAULT_FUEL_ECONOMY_KM_PER_UNIT, TrackSummary};
pub use track::{LineDiagnostic, LineIssue, Track, TrackPoint};

use std::path::PathBuf;

/// Error types for the trip metrics pipeline
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Failed to read log source {}: {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that all public types are accessible
        let _: fn() -> Config = Config::default;
        let _: fn(&str) -> std::result::Result<ParsedLine, ParseError> = parse_line;
        let _: fn(RolloverPolicy) -> DistanceAccumulator = DistanceAccumulator::new;
    }

    #[test]
    fn test_error_messages_name_the_source() {
        let err = DataError::SourceUnreadable {
            path: PathBuf::from("gps_1.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("gps_1.csv"));
    }

    #[test]
    fn test_error_variants() {
        let errors = [
            DataError::Io(std::io::Error::other("read failed")),
            DataError::InvalidConfig("fuel economy".to_string()),
        ];
        for err in errors {
            let prefix = match &err {
                DataError::SourceUnreadable { .. } => "Failed to read log source",
                DataError::Io(_) => "IO error",
                DataError::InvalidConfig(_) => "Invalid configuration",
            };
            assert!(err.to_string().starts_with(prefix));
        }
    }
}
