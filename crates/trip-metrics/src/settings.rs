use crate::cli::{get_env, parse_args};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use trip_metrics_lib::{Config, RolloverPolicy};

/// Environment variable overriding the default fuel economy
pub const FUEL_ECONOMY_ENV: &str = "TRIP_METRICS_FUEL_ECONOMY";

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Trip Metrics - Distance, duration, average speed and fuel estimates from GPS location logs
pub struct Settings {
    /// GPS log files to process, one trip per file
    #[clap(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Report format
    #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Include every point (time, position, segment distance) in the report
    #[clap(long, default_value = "false")]
    pub points: bool,

    /// Print dropped lines and backwards time steps in text reports
    #[clap(long, default_value = "false")]
    pub show_diagnostics: bool,

    /// Kilometers traveled per unit of fuel [default: 50.4, or $TRIP_METRICS_FUEL_ECONOMY]
    #[clap(long, value_name = "KM_PER_UNIT")]
    pub fuel_economy: Option<f64>,

    /// How to treat a time of day that goes backwards (e.g. a trip crossing midnight)
    #[clap(long, value_enum, default_value_t = Rollover::Raw)]
    pub rollover: Rollover,

    /// Process files one after another instead of in parallel
    #[clap(long, default_value = "false")]
    pub sequential: bool,

    /// Write every route as `<name>.gpx` into this directory
    #[clap(long, value_name = "DIR")]
    pub gpx_out: Option<PathBuf>,
}

/// Report formats
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Command-line spelling of [`RolloverPolicy`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Rollover {
    /// Add negative time deltas as they are
    Raw,
    /// Add a day to negative time deltas
    WrapMidnight,
}

impl From<Rollover> for RolloverPolicy {
    fn from(value: Rollover) -> Self {
        match value {
            Rollover::Raw => RolloverPolicy::Raw,
            Rollover::WrapMidnight => RolloverPolicy::WrapMidnight,
        }
    }
}

impl Settings {
    /// Parse settings from the command line, exiting with usage on error
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Pipeline configuration for these settings
    pub fn to_config(&self) -> Config {
        let defaults = Config::default();
        Config {
            fuel_economy_km_per_unit: self
                .fuel_economy
                .or_else(|| get_env(FUEL_ECONOMY_ENV))
                .unwrap_or(defaults.fuel_economy_km_per_unit),
            rollover: self.rollover.into(),
            parallel: !self.sequential,
        }
    }
}
