//! Trip Metrics - Application Library
//!
//! This is the command-line front end of the trip metrics pipeline: it reads the GPS logs
//! named on the command line, computes one trip summary per log and renders the results.

pub mod cli;
pub mod logging;
pub mod report;
pub mod settings;

pub use settings::{OutputFormat, Rollover, Settings};

use report::ReportOptions;
use std::path::PathBuf;
use trip_metrics_lib::{DataError, TrackCollection};

/// Errors surfaced to the user
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write GPX file {}: {source}", .path.display())]
    Gpx {
        path: PathBuf,
        #[source]
        source: gpx::errors::GpxError,
    },
}

/// Process every file named in `settings` and write the report to stdout
pub fn run(settings: &Settings) -> Result<(), AppError> {
    #[cfg(feature = "profiling")]
    profiling::scope!("trip_metrics::run");

    let config = settings.to_config();
    config.validate()?;
    tracing::debug!("Pipeline configuration: {:?}", config);

    let collection = TrackCollection::load_from_files(&settings.files, &config)?;

    if let Some(dir) = &settings.gpx_out {
        report::write_gpx_files(dir, &settings.files, &collection)?;
    }

    let options = ReportOptions {
        points: settings.points,
        diagnostics: settings.show_diagnostics,
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match settings.format {
        OutputFormat::Text => report::write_text(&mut out, &settings.files, &collection, options)?,
        OutputFormat::Json => report::write_json(&mut out, &settings.files, &collection, options)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::ffi::OsStr;

    #[test]
    fn test_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gps.csv");
        let settings =
            Settings::try_parse_from([OsStr::new("trip-metrics"), missing.as_os_str()]).unwrap();

        let err = run(&settings).unwrap_err();
        assert!(matches!(
            err,
            AppError::Data(DataError::SourceUnreadable { .. })
        ));
        assert!(err.to_string().contains("gps.csv"));
    }

    #[test]
    fn test_invalid_fuel_economy_fails() {
        let settings =
            Settings::try_parse_from(["trip-metrics", "--fuel-economy", "0", "gps.csv"]).unwrap();
        assert!(matches!(
            run(&settings),
            Err(AppError::Data(DataError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_run_writes_gpx() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("ride.csv");
        std::fs::write(
            &log,
            "2024-01-01T10:00:00.000Z,{\"lat\":1.0,\"lon\":2.0}\n\
             2024-01-01T10:05:00.000Z,{\"lat\":1.01,\"lon\":2.0}\n",
        )
        .unwrap();
        let out = dir.path().join("routes");

        let settings = Settings::try_parse_from([
            OsStr::new("trip-metrics"),
            OsStr::new("--gpx-out"),
            out.as_os_str(),
            log.as_os_str(),
        ])
        .unwrap();
        run(&settings).unwrap();

        assert!(out.join("ride.gpx").exists());
    }
}
