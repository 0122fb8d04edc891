//! Tracing subscriber setup.

use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Wall-clock format used for every log line.
pub const TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Logging options.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset or invalid.
    pub default_filter: String,
    pub ansi: bool,
    /// Include file and line of the call site.
    pub source_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            ansi: true,
            source_location: true,
        }
    }
}

impl LogConfig {
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.default_filter))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Install the global subscriber.
///
/// Later calls are ignored.
pub fn init_logging(config: &LogConfig) {
    let layer = fmt::layer()
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_ansi(config.ansi)
        .with_target(false)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let subscriber = tracing_subscriber::registry()
        .with(config.filter())
        .with(layer);

    let _ = tracing::subscriber::set_global_default(subscriber);
}
