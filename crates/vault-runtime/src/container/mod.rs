//! # Vault Container
//!
//! Configuration and the context object holding every subsystem.

pub mod config;
pub mod context;

pub use config::{ConfigError, RegistryConfig, TelemetryConfig, VaultConfig};
pub use context::{Decoder, Registry, Signer, Transport, VaultContext};
