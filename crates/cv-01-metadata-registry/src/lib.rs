//! # Metadata Registry (cv-01)
//!
//! Versioned chain metadata, network specs and the verifier pinned to each
//! network. Every other subsystem reads from here; updates arrive through
//! scanned `LOAD_METADATA` / `ADD_SPECS` payloads.
//!
//! ## Update Flow
//!
//! ```text
//! Payload Decoder (3) ──UpdateCandidate──→ evaluate()  (dry run, for the preview)
//!                                              ↓
//!                          user approves ──→ accept()  (check, persist, apply, log)
//!
//! Settings screen ──→ remove_network() / remove_metadata()
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Unique Versions | At most one metadata record per (network, version) |
//! | 2 | Immutable Content | A stored version is never replaced with different bytes |
//! | 3 | Pin Monotonicity | A verifier only moves from none to a key, never away from a key |
//! | 4 | Atomic Accept | A rejected update leaves store and state untouched |
//! | 5 | Specs First | Metadata is accepted only for a network with known specs |
//! | 6 | Dead Stays Dead | A network removed under a custom key refuses every later update |
//!
//! ## Pinning Rules
//!
//! | Current pin | Offered | Result |
//! |-------------|---------|--------|
//! | (new network) | none | accept, pin none, warn |
//! | (new network) | general key G | accept, pin general |
//! | (new network) | key K | accept, pin K |
//! | dead | anything | reject |
//! | none | none | accept, warn |
//! | none | key K | accept, upgrade pin to K (or general if K is G) |
//! | key K | key K | accept |
//! | key K | key L | reject |
//! | key K | none | reject |
//!
//! A general pin behaves as the general verifier's key. Removing a network
//! keeps its pin, except that a custom key becomes dead.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pure domain logic (state, pinning, errors)
//! - `ports/` - Port traits (inbound API, outbound SPI)
//! - `service.rs` - Application service implementing the API
//!
//! ## Usage
//!
//! ```ignore
//! use cv_01_metadata_registry::{MetadataRegistryApi, MetadataRegistryService};
//!
//! let registry = MetadataRegistryService::in_memory(history);
//! registry.accept(&UpdateCandidate::network_specs(specs))?;
//! let loaded = registry.lookup(&genesis_hash, 9430)?;
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use domain::entities::{
    Accepted, LoadedMetadata, NetworkPin, PinTransition, RegistrySnapshot, RegistryWarning,
    RegistryWrite, Removal, UpdatePlan,
};
pub use domain::errors::{RegistryError, StoreError, TrustViolation};
pub use domain::state::RegistryState;
pub use domain::trust::check_pin;
pub use ports::inbound::MetadataRegistryApi;
pub use ports::outbound::{
    DefaultSignatureChecker, HistoryLog, InMemoryHistoryLog, InMemoryRegistryStore,
    RegistryStore, SignatureChecker, SystemTimeSource, TimeSource,
};
pub use service::MetadataRegistryService;
