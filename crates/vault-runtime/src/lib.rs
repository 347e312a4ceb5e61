//! # Cold Vault Runtime
//!
//! Builds the vault once at startup and runs its loops.
//!
//! ## Architecture
//!
//! ```text
//! camera ──frames──→ CaptureLoop ──→ QrTransport (cv-02)
//!                                        │ PayloadReassembled
//!                                        ↓
//!                                   event queue (shared-bus)
//!                                        │
//!                                        ↓
//!                                 ScanEventHandler ──TransactionFetched──┐
//!                                                                        ↓
//! screen layer ──actions──→ NavigatorHandle ──→ control task ──→ Navigator (cv-05)
//!                                                                   │
//!                         Registry (cv-01) ←── Decoder (cv-03) ←────┤
//!                                                Signer (cv-04) ←───┘
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, then `CV_*` environment variables)
//! 2. Install the tracing subscriber
//! 3. Build the `VaultContext`
//! 4. Spawn the control task, capture loop and scan event handler
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and the context object
//! - `adapters/` - Port implementations connecting subsystems
//! - `handlers/` - Capture loop and scan event handler
//! - `runtime.rs` - Task spawning and shutdown
//! - `telemetry.rs` - Logging setup

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod runtime;
pub mod telemetry;

// Re-export key types for convenience
pub use adapters::RegistryLookup;
pub use container::{
    ConfigError, RegistryConfig, TelemetryConfig, VaultConfig, VaultContext,
};
pub use handlers::{CaptureLoop, ScanEventHandler};
pub use runtime::VaultRuntime;
pub use telemetry::init_tracing;
