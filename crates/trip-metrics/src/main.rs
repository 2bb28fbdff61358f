use std::process::ExitCode;
use trip_metrics::{Settings, logging, run};

fn main() -> ExitCode {
    logging::setup_logging();
    logging::log_version_info();

    let settings = Settings::from_cli();
    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
