//! TrackCollection - Multi-track pipeline
//!
//! This module provides the high-level API for processing several GPS logs at once.
//! Every log is processed independently and results are kept in source order.

use crate::summary::DEFAULT_FUEL_ECONOMY_KM_PER_UNIT;
use crate::utils::round2;
use crate::{DataError, Result, RolloverPolicy, Track, TrackPoint};

use geo::Rect;
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the trip metrics pipeline
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Kilometers traveled per unit of fuel (default 50.4, a motorbike)
    pub fuel_economy_km_per_unit: f64,
    /// Handling of time-of-day values that go backwards (default: raw deltas)
    pub rollover: RolloverPolicy,
    /// Process sources on the rayon thread pool (default true).
    /// Results are identical either way.
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fuel_economy_km_per_unit: DEFAULT_FUEL_ECONOMY_KM_PER_UNIT,
            rollover: RolloverPolicy::default(),
            parallel: true,
        }
    }
}

impl Config {
    /// Check that the configuration can produce meaningful metrics
    pub fn validate(&self) -> Result<()> {
        if !self.fuel_economy_km_per_unit.is_finite() || self.fuel_economy_km_per_unit <= 0.0 {
            return Err(DataError::InvalidConfig(format!(
                "fuel economy must be a positive number of km per unit, got {}",
                self.fuel_economy_km_per_unit
            )));
        }
        Ok(())
    }
}

/// Information about the track collection
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollectionInfo {
    /// Number of processed sources
    pub track_count: usize,
    /// Total number of valid points
    pub total_points: usize,
    /// Total number of dropped lines
    pub skipped_lines: usize,
    /// Total distance in kilometers
    pub total_distance_km: f64,
}

/// Per-source results laid out as parallel collections
///
/// Entry `i` of every vector belongs to source `i`. Distance, speed and fuel are the
/// rounded display values.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackColumns {
    pub points: Vec<Vec<TrackPoint>>,
    pub total_distances_km: Vec<f64>,
    pub total_durations_seconds: Vec<i64>,
    pub average_speeds_kmh: Vec<f64>,
    pub fuel_consumptions: Vec<f64>,
    pub formatted_durations: Vec<String>,
}

/// Processed tracks, one per source, in source order
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackCollection {
    tracks: Vec<Track>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl TrackCollection {
    /// Process in-memory sources, each a sequence of raw lines
    pub fn process_sources<L, S>(sources: Vec<L>, config: &Config) -> Self
    where
        L: IntoIterator<Item = S> + Send,
        S: AsRef<str>,
    {
        #[cfg(feature = "profiling")]
        profiling::scope!("collection::process_sources");

        let tracks: Vec<Track> = if config.parallel {
            sources
                .into_par_iter()
                .map(|lines| Track::from_lines(lines, config))
                .collect()
        } else {
            sources
                .into_iter()
                .map(|lines| Track::from_lines(lines, config))
                .collect()
        };

        let collection = Self { tracks };
        collection.log_info();
        collection
    }

    /// Read each log file to completion and process it
    ///
    /// A missing or unreadable file aborts the whole run with
    /// [`DataError::SourceUnreadable`]; malformed lines never do.
    pub fn load_from_files<P: AsRef<Path> + Send + Sync>(
        paths: &[P],
        config: &Config,
    ) -> Result<Self> {
        #[cfg(feature = "profiling")]
        profiling::scope!("collection::load_from_files");

        let load = |path: &P| -> Result<Track> {
            let path = path.as_ref();
            tracing::debug!("Loading GPS log {}", path.display());
            let unreadable = |source: std::io::Error| DataError::SourceUnreadable {
                path: path.to_path_buf(),
                source,
            };
            let file = std::fs::File::open(path).map_err(unreadable)?;
            let reader = std::io::BufReader::new(file);
            Track::from_reader(reader, config).map_err(|err| match err {
                DataError::Io(source) => unreadable(source),
                other => other,
            })
        };

        let tracks: Result<Vec<Track>> = if config.parallel {
            paths.par_iter().map(load).collect()
        } else {
            paths.iter().map(load).collect()
        };

        let collection = Self { tracks: tracks? };
        collection.log_info();
        Ok(collection)
    }

    /// All tracks in source order
    #[inline]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Get a track by source index
    #[inline]
    pub fn get_track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Number of processed sources
    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the collection is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Split the results into parallel per-source collections
    pub fn columns(&self) -> TrackColumns {
        let mut columns = TrackColumns::default();
        for track in &self.tracks {
            let summary = track.summary().rounded();
            columns.points.push(track.points().to_vec());
            columns.total_distances_km.push(summary.total_distance_km);
            columns
                .total_durations_seconds
                .push(summary.total_duration_seconds);
            columns.average_speeds_kmh.push(summary.average_speed_kmh);
            columns
                .fuel_consumptions
                .push(summary.fuel_consumption_units);
            columns.formatted_durations.push(summary.formatted_duration);
        }
        columns
    }

    /// Get collection information
    pub fn get_info(&self) -> CollectionInfo {
        CollectionInfo {
            track_count: self.tracks.len(),
            total_points: self.tracks.iter().map(|t| t.points().len()).sum(),
            skipped_lines: self.tracks.iter().map(Track::skipped_lines).sum(),
            total_distance_km: self
                .tracks
                .iter()
                .map(|t| t.summary().total_distance_km)
                .sum(),
        }
    }

    /// Combined bounding box of all tracks in WGS84 degrees (x = longitude, y = latitude)
    ///
    /// Returns `None` if no track has any point.
    pub fn bounding_box(&self) -> Option<Rect<f64>> {
        self.tracks
            .iter()
            .filter_map(Track::bounding_box)
            .reduce(|acc, bbox| {
                Rect::new(
                    geo::Coord {
                        x: acc.min().x.min(bbox.min().x),
                        y: acc.min().y.min(bbox.min().y),
                    },
                    geo::Coord {
                        x: acc.max().x.max(bbox.max().x),
                        y: acc.max().y.max(bbox.max().y),
                    },
                )
            })
    }

    /// Center of all tracks as `(lat, lon)`, useful to position a map
    #[inline]
    pub fn center_wgs84(&self) -> Option<(f64, f64)> {
        self.bounding_box().map(|bbox| {
            let center = bbox.center();
            (center.y, center.x)
        })
    }

    fn log_info(&self) {
        let info = self.get_info();
        tracing::info!(
            "Processed {} GPS logs: {} points, {} skipped lines, {:.2} km",
            info.track_count,
            info.total_points,
            info.skipped_lines,
            round2(info.total_distance_km)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn source(points: &[(u32, f64, f64)]) -> Vec<String> {
        points
            .iter()
            .map(|&(seconds, lat, lon)| {
                format!(
                    "2024-05-01T{:02}:{:02}:{:02}.000Z,{{\"lat\":{lat:?},\"lon\":{lon:?}}}",
                    seconds / 3600,
                    (seconds % 3600) / 60,
                    seconds % 60
                )
            })
            .collect()
    }

    fn three_sources() -> Vec<Vec<String>> {
        let mut first = source(&[(36000, 0.0, 0.0), (37800, 0.0, 0.5), (39600, 0.0, 1.0)]);
        first.insert(1, "corrupted".to_string());
        let second = Vec::new();
        let third = source(&[(3600, 45.0, 7.0), (3660, 45.01, 7.0)]);
        vec![first, second, third]
    }

    #[test]
    fn test_three_sources_in_order() {
        let collection = TrackCollection::process_sources(three_sources(), &Config::default());

        assert_eq!(collection.len(), 3);
        let lengths: Vec<usize> = collection.tracks().iter().map(|t| t.points().len()).collect();
        assert_eq!(lengths, vec![3, 0, 2]);

        let first = collection.get_track(0).unwrap().summary();
        assert!((first.total_distance_km - 111.19).abs() < 0.1);
        assert_eq!(first.total_duration_seconds, 3600);

        let second = collection.get_track(1).unwrap().summary();
        assert!(second.is_zero());
        assert_eq!(second.average_speed_kmh, 0.0);
        assert_eq!(second.fuel_consumption_units, 0.0);
        assert_eq!(second.formatted_duration, "0h 0m 0s");

        let third = collection.get_track(2).unwrap().summary();
        assert_eq!(third.total_duration_seconds, 60);
    }

    #[test]
    fn test_sources_are_independent() {
        let alone = TrackCollection::process_sources(
            vec![source(&[(3600, 45.0, 7.0), (3660, 45.01, 7.0)])],
            &Config::default(),
        );
        let together = TrackCollection::process_sources(three_sources(), &Config::default());

        assert_eq!(alone.tracks()[0], together.tracks()[2]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = Config {
            parallel: false,
            ..Config::default()
        };
        let a = TrackCollection::process_sources(three_sources(), &Config::default());
        let b = TrackCollection::process_sources(three_sources(), &sequential);
        assert_eq!(a, b);
    }

    #[test]
    fn test_columns_are_parallel() {
        let collection = TrackCollection::process_sources(three_sources(), &Config::default());
        let columns = collection.columns();

        assert_eq!(columns.points.len(), 3);
        assert_eq!(columns.total_distances_km.len(), 3);
        assert_eq!(columns.total_durations_seconds, vec![3600, 0, 60]);
        assert_eq!(columns.average_speeds_kmh[1], 0.0);
        assert_eq!(columns.fuel_consumptions[1], 0.0);
        assert_eq!(
            columns.formatted_durations,
            vec!["1h 0m 0s", "0h 0m 0s", "0h 1m 0s"]
        );
        assert_eq!(columns.fuel_consumptions[0], round2(columns.fuel_consumptions[0]));
    }

    #[test]
    fn test_collection_info_and_bounds() {
        let collection = TrackCollection::process_sources(three_sources(), &Config::default());
        let info = collection.get_info();

        assert_eq!(info.track_count, 3);
        assert_eq!(info.total_points, 5);
        assert_eq!(info.skipped_lines, 1);

        let bbox = collection.bounding_box().unwrap();
        assert_eq!(bbox.min().x, 0.0);
        assert_eq!(bbox.max().x, 7.0);
        assert_eq!(bbox.max().y, 45.01);
        assert!(collection.center_wgs84().is_some());
    }

    #[test]
    fn test_empty_collection() {
        let collection =
            TrackCollection::process_sources(Vec::<Vec<String>>::new(), &Config::default());
        assert!(collection.is_empty());
        assert!(collection.bounding_box().is_none());
        assert_eq!(collection.get_info(), CollectionInfo::default());
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for (i, lines) in three_sources().iter().enumerate() {
            let path = dir.path().join(format!("gps_{i}.csv"));
            let mut file = std::fs::File::create(&path).unwrap();
            for line in lines {
                writeln!(file, "{line}").unwrap();
            }
            paths.push(path);
        }

        let from_files =
            TrackCollection::load_from_files(paths.as_slice(), &Config::default()).unwrap();
        let in_memory = TrackCollection::process_sources(three_sources(), &Config::default());
        assert_eq!(from_files, in_memory);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("gps.csv");
        std::fs::write(&good, "").unwrap();
        let missing = dir.path().join("does_not_exist.csv");

        let result = TrackCollection::load_from_files(&[good, missing.clone()], &Config::default());
        match result {
            Err(DataError::SourceUnreadable { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected SourceUnreadable, got {other:?}"),
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());
        let invalid = Config {
            fuel_economy_km_per_unit: 0.0,
            ..Config::default()
        };
        assert!(matches!(invalid.validate(), Err(DataError::InvalidConfig(_))));
    }
}
