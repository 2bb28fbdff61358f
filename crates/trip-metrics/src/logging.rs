/*!
Logging integration for the trip-metrics binary.

Logs go to stderr so that reports written to stdout (in particular JSON) stay
machine-readable. The filter is taken from `RUST_LOG`, with a default that
depends on the build profile.
*/

use tracing_subscriber::prelude::*;

/// Initialize logging with sensible defaults.
///
/// Behavior:
/// - If RUST_LOG is not set, set a helpful default.
/// - Register a fmt layer filtered by `EnvFilter`.
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    if std::env::var("RUST_LOG").is_err() {
        // Safety: single-threaded at startup
        unsafe {
            std::env::set_var("RUST_LOG", default_filter());
        }
    }

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::debug!("Logging initialized");
}

/// `RUST_LOG` value used when the environment does not set one
fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Log the name and version of the running binary.
pub fn log_version_info() {
    tracing::info!(
        "{} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
}
