//! # Vault Configuration
//!
//! Unified configuration for all subsystems and the runtime.
//!
//! Every value has a default; `CV_*` environment variables override them.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `CV_SESSION_TIMEOUT_SECS` | `transport.session_timeout_secs` |
//! | `CV_MAX_SESSIONS` | `transport.max_sessions` |
//! | `CV_MAX_PAYLOAD_LEN` | `transport.max_payload_len` |
//! | `CV_FRAME_CAPACITY` | `transport.frame_capacity` |
//! | `CV_MAX_CALL_LEN` | `decoder.max_decodable_call_len` |
//! | `CV_ALLOW_BLIND_SIGNING` | `decoder.allow_blind_signing` |
//! | `CV_MAX_TYPE_DEPTH` | `decoder.max_type_depth` |
//! | `CV_MAX_PATH_DEPTH` | `signing.max_path_depth` |
//! | `CV_MAX_SIGN_ATTEMPTS` | `navigation.max_sign_attempts` |
//! | `CV_LOG_ENTRIES_SHOWN` | `navigation.log_entries_shown` |
//! | `CV_LOG_LEVEL` | `telemetry.log_level` |
//! | `CV_LOG_JSON` | `telemetry.json_logs` |
//! | `CV_GENERAL_VERIFIER` | `registry.general_verifier`, as `<scheme>:<hex>` |

use cv_02_qr_transport::TransportConfig;
use cv_03_payload_decoder::DecoderConfig;
use cv_04_signature_engine::SigningConfig;
use cv_05_navigation::NavigationConfig;
use serde::{Deserialize, Serialize};
use shared_types::MultiSigner;
use std::str::FromStr;
use thiserror::Error;

/// Complete vault configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Scanning and outbound frames.
    pub transport: TransportConfig,
    /// Payload decoding.
    pub decoder: DecoderConfig,
    /// Key derivation.
    pub signing: SigningConfig,
    /// Navigation limits.
    pub navigation: NavigationConfig,
    /// Logging.
    pub telemetry: TelemetryConfig,
    /// Trust roots.
    pub registry: RegistryConfig,
}

/// Registry trust configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Key networks may be pinned to as a group (default: none).
    pub general_verifier: Option<MultiSigner>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is unset (default: `info`).
    pub log_level: String,
    /// JSON lines instead of human-readable output (default: false).
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            json_logs: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("{var}={value:?} is not a valid value")]
    InvalidVar {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// A value is outside its allowed range.
    #[error("{field} {reason}")]
    OutOfRange {
        /// Field path.
        field: &'static str,
        /// What is wrong.
        reason: &'static str,
    },
}

impl VaultConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let t = &mut config.transport;
        override_with(&lookup, "CV_SESSION_TIMEOUT_SECS", &mut t.session_timeout_secs)?;
        override_with(&lookup, "CV_MAX_SESSIONS", &mut t.max_sessions)?;
        override_with(&lookup, "CV_MAX_PAYLOAD_LEN", &mut t.max_payload_len)?;
        override_with(&lookup, "CV_FRAME_CAPACITY", &mut t.frame_capacity)?;

        let d = &mut config.decoder;
        override_with(&lookup, "CV_MAX_CALL_LEN", &mut d.max_decodable_call_len)?;
        override_with(&lookup, "CV_ALLOW_BLIND_SIGNING", &mut d.allow_blind_signing)?;
        override_with(&lookup, "CV_MAX_TYPE_DEPTH", &mut d.max_type_depth)?;

        override_with(&lookup, "CV_MAX_PATH_DEPTH", &mut config.signing.max_path_depth)?;

        let n = &mut config.navigation;
        override_with(&lookup, "CV_MAX_SIGN_ATTEMPTS", &mut n.max_sign_attempts)?;
        override_with(&lookup, "CV_LOG_ENTRIES_SHOWN", &mut n.log_entries_shown)?;

        if let Some(level) = lookup("CV_LOG_LEVEL") {
            config.telemetry.log_level = level;
        }
        override_with(&lookup, "CV_LOG_JSON", &mut config.telemetry.json_logs)?;

        if let Some(value) = lookup("CV_GENERAL_VERIFIER") {
            let signer = value.trim().parse().map_err(|_| ConfigError::InvalidVar {
                var: "CV_GENERAL_VERIFIER",
                value,
            })?;
            config.registry.general_verifier = Some(signer);
        }
        Ok(config)
    }

    /// Reject values the subsystems cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            (self.transport.max_sessions == 0, "transport.max_sessions"),
            (self.transport.frame_capacity == 0, "transport.frame_capacity"),
            (self.transport.max_payload_len == 0, "transport.max_payload_len"),
            (self.transport.session_timeout_secs == 0, "transport.session_timeout_secs"),
            (self.decoder.max_type_depth == 0, "decoder.max_type_depth"),
            (self.signing.max_path_depth == 0, "signing.max_path_depth"),
            (self.navigation.max_sign_attempts == 0, "navigation.max_sign_attempts"),
        ];
        match checks.into_iter().find(|(zero, _)| *zero) {
            Some((_, field)) => Err(ConfigError::OutOfRange {
                field,
                reason: "must be at least 1",
            }),
            None => Ok(()),
        }
    }
}

fn override_with<F, T>(
    lookup: &F,
    var: &'static str,
    target: &mut T,
) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = lookup(var) {
        *target = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidVar { var, value })?;
    }
    Ok(())
}
