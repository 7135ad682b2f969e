//! # Observability Infrastructure
//!
//! Structured logging setup for the rotation handler using the tracing
//! ecosystem. The handler logs span-scoped events with structured fields
//! (`secret_id`, `step`, `invocation_id`); secret values never reach the log
//! stream.

use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};

/// Initialize the global tracing subscriber.
///
/// The filter defaults to the configured log level and can be overridden per
/// invocation through `RUST_LOG`. JSON output is meant for the scheduler's
/// log pipeline; the human-readable format is for local development.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| Error::config(format!("Invalid log filter: {}", e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let init_result = if config.json_logs {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    init_result.map_err(|e| Error::internal(format!("Failed to initialize logging: {}", e)))?;

    tracing::info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_accepts_default_config() {
        // First initialization in the test binary wins; later calls must
        // surface the double-init as an error rather than panic.
        let config = ObservabilityConfig::default();
        let first = init_tracing(&config);
        let second = init_tracing(&config);

        assert!(first.is_ok() || second.is_err());
    }

    #[test]
    fn test_init_tracing_rejects_bad_filter() {
        // The RUST_LOG override would mask the configured level entirely.
        std::env::remove_var("RUST_LOG");

        let config = ObservabilityConfig {
            log_level: "not==a==filter".to_string(),
            ..ObservabilityConfig::default()
        };
        let result = init_tracing(&config);
        assert!(result.is_err());
    }
}
