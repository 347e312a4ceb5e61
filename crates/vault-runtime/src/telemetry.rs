//! # Telemetry
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` wins over
//! `TelemetryConfig::log_level`; output is human-readable unless
//! `json_logs` is set.

use crate::container::config::TelemetryConfig;
use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter the subscriber will use.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("invalid log filter {:?}", config.log_level))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &TelemetryConfig) -> Result<()> {
    let filter = env_filter(config)?;

    if config.json_logs {
        // JSON lines for log shippers
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .try_init()
            .context("tracing subscriber already installed")?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .context("tracing subscriber already installed")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_filter() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = TelemetryConfig {
            log_level: "cv_05_navigation=loudest".into(),
            json_logs: false,
        };
        assert!(env_filter(&config).is_err());
    }

    #[test]
    fn test_second_init_fails() {
        let config = TelemetryConfig::default();
        // Whichever test runs first installs the subscriber.
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
