//! # Observability Infrastructure
//!
//! Structured logging for the certgate service. Log output goes through a
//! `tracing-subscriber` formatter, plain text or JSON, filtered by
//! `RUST_LOG` when set and by the configured log level otherwise.

pub mod logging;

pub use logging::log_config_info;

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize the global logging subscriber
///
/// Fails when a subscriber is already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.log_level, e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json_logging {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| Error::internal(format!("Failed to install log subscriber: {}", e)))?;

    info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        json_logging = config.json_logging,
        "Logging initialized"
    );
    Ok(())
}
