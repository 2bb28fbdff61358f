//! Rendering of processed trips
//!
//! Reports are the presentation side of the pipeline: a human-readable text summary per
//! trip, a JSON document for other programs, and GPX files for plotting routes on a map.

use crate::AppError;
use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use trip_metrics_lib::{LineDiagnostic, Track, TrackCollection, TrackPoint, TrackSummary};

/// What to include besides the summary
#[derive(Clone, Copy, Debug, Default)]
pub struct ReportOptions {
    pub points: bool,
    pub diagnostics: bool,
}

/// JSON shape of one trip
#[derive(Debug, Serialize)]
struct TripReport<'a> {
    source: &'a Path,
    summary: TrackSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    points: Option<&'a [TrackPoint]>,
    diagnostics: &'a [LineDiagnostic],
}

/// Write one summary block per trip
pub fn write_text<W: Write>(
    out: &mut W,
    sources: &[PathBuf],
    collection: &TrackCollection,
    options: ReportOptions,
) -> std::io::Result<()> {
    for (index, (source, track)) in sources.iter().zip(collection.tracks()).enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        write_track_text(out, source, track, options)?;
    }
    Ok(())
}

fn write_track_text<W: Write>(
    out: &mut W,
    source: &Path,
    track: &Track,
    options: ReportOptions,
) -> std::io::Result<()> {
    let summary = track.summary().rounded();

    writeln!(out, "{}", source.display())?;
    writeln!(out, "  Distance:      {:.2} km", summary.total_distance_km)?;
    writeln!(out, "  Duration:      {}", summary.formatted_duration)?;
    writeln!(out, "  Average speed: {:.2} km/h", summary.average_speed_kmh)?;
    writeln!(out, "  Fuel:          {:.2} units", summary.fuel_consumption_units)?;
    writeln!(
        out,
        "  Points:        {} ({} lines skipped)",
        track.points().len(),
        track.skipped_lines()
    )?;

    if options.points {
        for point in track.points() {
            writeln!(
                out,
                "    {}  {:>11.6} {:>11.6}  +{:.3} km",
                point.time_of_day(),
                point.latitude,
                point.longitude,
                point.segment_distance_km
            )?;
        }
    }

    if options.diagnostics {
        for diagnostic in track.diagnostics() {
            writeln!(out, "    line {}: {}", diagnostic.line_number, diagnostic.issue)?;
        }
    }

    Ok(())
}

/// Write all trips as a pretty-printed JSON array
pub fn write_json<W: Write>(
    out: &mut W,
    sources: &[PathBuf],
    collection: &TrackCollection,
    options: ReportOptions,
) -> Result<(), AppError> {
    let reports: Vec<TripReport<'_>> = sources
        .iter()
        .zip(collection.tracks())
        .map(|(source, track)| TripReport {
            source,
            summary: track.summary().rounded(),
            points: options.points.then(|| track.points()),
            diagnostics: track.diagnostics(),
        })
        .collect();

    serde_json::to_writer_pretty(&mut *out, &reports)?;
    writeln!(out)?;
    Ok(())
}

/// Write every trip as `<file stem>.gpx` into `dir`
///
/// Name clashes get the source index appended, then a counter until the name is
/// unused. Returns the written paths in source order.
pub fn write_gpx_files(
    dir: &Path,
    sources: &[PathBuf],
    collection: &TrackCollection,
) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(dir)?;

    let mut used = HashSet::new();
    let mut written = Vec::with_capacity(sources.len());

    for (index, (source, track)) in sources.iter().zip(collection.tracks()).enumerate() {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("track")
            .to_string();
        let mut file_name = format!("{stem}.gpx");
        let mut attempt = 0;
        while !used.insert(file_name.clone()) {
            file_name = if attempt == 0 {
                format!("{stem}-{index}.gpx")
            } else {
                format!("{stem}-{index}-{attempt}.gpx")
            };
            attempt += 1;
        }

        let path = dir.join(file_name);
        let file = std::fs::File::create(&path)?;
        gpx::write(&track.to_gpx(Some(stem)), std::io::BufWriter::new(file)).map_err(
            |source| AppError::Gpx {
                path: path.clone(),
                source,
            },
        )?;

        tracing::info!("Wrote {} points to {}", track.points().len(), path.display());
        written.push(path);
    }

    Ok(written)
}
