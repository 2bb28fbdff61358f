//! Track storage and processing module
//!
//! This module provides the `Track` struct: the ordered valid points of one GPS log with
//! their segment distances, the derived summary, and diagnostics for every dropped line.

use crate::{
    Config, DistanceAccumulator, ParseError, Result, TrackSummary, parse_line, utils,
};
use geo::{Point, Rect};
use std::io::BufRead;

/// A valid point of a track
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackPoint {
    /// Seconds since midnight, in `[0, 86399]`
    pub time_of_day_seconds: u32,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Distance from the preceding valid point in kilometers (0 for the first point)
    pub segment_distance_km: f64,
}

impl TrackPoint {
    /// Time of day as `HH:MM:SS`
    #[inline]
    pub fn time_of_day(&self) -> String {
        utils::format_time_of_day(self.time_of_day_seconds)
    }

    /// Position as a `geo::Point` (x = longitude, y = latitude)
    #[inline]
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// Something worth reporting about a single log line
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineIssue {
    /// The line was dropped
    Skipped(ParseError),
    /// The line was kept but its time of day is earlier than the previous point's
    TimeWentBackwards { previous: u32, current: u32 },
}

impl std::fmt::Display for LineIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::TimeWentBackwards { previous, current } => write!(
                f,
                "time went backwards from {} to {}",
                utils::format_time_of_day(*previous),
                utils::format_time_of_day(*current)
            ),
        }
    }
}

/// Diagnostic attached to a line of the source
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineDiagnostic {
    /// 1-based line number in the source
    pub line_number: usize,
    pub issue: LineIssue,
}

/// One processed GPS log
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track {
    points: Vec<TrackPoint>,
    summary: TrackSummary,
    diagnostics: Vec<LineDiagnostic>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Track {
    /// Process the raw lines of one log
    ///
    /// Lines are handled strictly in order; malformed lines are dropped and recorded
    /// as diagnostics without affecting the rest of the log.
    pub fn from_lines<I, S>(lines: I, config: &Config) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        #[cfg(feature = "profiling")]
        profiling::scope!("track::from_lines");

        let mut builder = TrackBuilder::new(config);
        for line in lines {
            builder.push_line(line.as_ref());
        }
        builder.finish()
    }

    /// Read a log to completion and process it
    ///
    /// IO failures (including invalid UTF-8) are fatal and returned as errors.
    pub fn from_reader<R: BufRead>(reader: R, config: &Config) -> Result<Self> {
        #[cfg(feature = "profiling")]
        profiling::scope!("track::from_reader");

        let mut builder = TrackBuilder::new(config);
        for line in reader.lines() {
            builder.push_line(&line?);
        }
        Ok(builder.finish())
    }

    /// All valid points in log order
    #[inline]
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Summary metrics of the track
    #[inline]
    pub fn summary(&self) -> &TrackSummary {
        &self.summary
    }

    /// Diagnostics for dropped lines and backwards time steps
    #[inline]
    pub fn diagnostics(&self) -> &[LineDiagnostic] {
        &self.diagnostics
    }

    /// Number of lines that were dropped
    pub fn skipped_lines(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.issue, LineIssue::Skipped(_)))
            .count()
    }

    /// Check if the track has no valid points
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box in WGS84 degrees (x = longitude, y = latitude)
    ///
    /// Returns `None` for a track without points.
    pub fn bounding_box(&self) -> Option<Rect<f64>> {
        let first = self.points.first()?;
        let mut min = geo::Coord {
            x: first.longitude,
            y: first.latitude,
        };
        let mut max = min;
        for point in &self.points[1..] {
            min.x = min.x.min(point.longitude);
            min.y = min.y.min(point.latitude);
            max.x = max.x.max(point.longitude);
            max.y = max.y.max(point.latitude);
        }
        Some(Rect::new(min, max))
    }

    /// Convert the route to GPX (one track, one segment, positions only)
    pub fn to_gpx(&self, name: Option<String>) -> gpx::Gpx {
        let mut segment = gpx::TrackSegment::default();
        segment
            .points
            .extend(self.points.iter().map(|p| gpx::Waypoint::new(p.point())));

        let mut track = gpx::Track::default();
        track.name = name;
        track.segments.push(segment);

        gpx::Gpx {
            version: gpx::GpxVersion::Gpx11,
            creator: Some(env!("CARGO_PKG_NAME").to_string()),
            tracks: vec![track],
            ..Default::default()
        }
    }
}

/// Line-by-line fold producing a [`Track`]
struct TrackBuilder {
    accumulator: DistanceAccumulator,
    fuel_economy_km_per_unit: f64,
    points: Vec<TrackPoint>,
    diagnostics: Vec<LineDiagnostic>,
    line_number: usize,
}

impl TrackBuilder {
    fn new(config: &Config) -> Self {
        Self {
            accumulator: DistanceAccumulator::new(config.rollover),
            fuel_economy_km_per_unit: config.fuel_economy_km_per_unit,
            points: Vec::new(),
            diagnostics: Vec::new(),
            line_number: 0,
        }
    }

    fn push_line(&mut self, line: &str) {
        self.line_number += 1;

        let parsed = match parse_line(line) {
            Ok(parsed) => parsed,
            Err(reason) => {
                tracing::debug!("Skipping line {}: {}", self.line_number, reason);
                self.diagnostics.push(LineDiagnostic {
                    line_number: self.line_number,
                    issue: LineIssue::Skipped(reason),
                });
                return;
            }
        };

        let previous = self.points.last().map(|p| p.time_of_day_seconds);
        let step = self.accumulator.push(parsed);
        if let (true, Some(previous)) = (step.went_backwards(), previous) {
            tracing::warn!(
                "Time went backwards at line {} ({} -> {})",
                self.line_number,
                utils::format_time_of_day(previous),
                step.point.time_of_day()
            );
            self.diagnostics.push(LineDiagnostic {
                line_number: self.line_number,
                issue: LineIssue::TimeWentBackwards {
                    previous,
                    current: step.point.time_of_day_seconds,
                },
            });
        }
        self.points.push(step.point);
    }

    fn finish(self) -> Track {
        let totals = self.accumulator.finish();
        Track {
            points: self.points,
            summary: TrackSummary::from_totals(&totals, self.fuel_economy_km_per_unit),
            diagnostics: self.diagnostics,
        }
    }
}
