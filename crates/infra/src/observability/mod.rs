//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events; binaries and integration
//! harnesses call [`init`] once to print them.

use daterange_domain::{DateRangeError, LoggingConfig, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global subscriber writing compact lines to stderr.
///
/// `RUST_LOG` wins over the configured level when set.
///
/// # Errors
/// [`DateRangeError::Configuration`] when the level is not a valid filter
/// directive or a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(filter(config)?)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init()
        .map_err(|e| DateRangeError::Configuration(format!("tracing already initialised: {e}")))
}

fn filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            DateRangeError::Configuration(format!("invalid log level '{}': {e}", config.level))
        }),
    }
}
