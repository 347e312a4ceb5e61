//! # Signature Engine (cv-04)
//!
//! Deterministic key derivation from seed phrases and signing of decoded
//! payloads for three schemes.
//!
//! | Scheme | Curve | Public key | Soft junctions |
//! |--------|-------|------------|----------------|
//! | Ed25519 | edwards25519 | 32 bytes | no |
//! | Schnorr | secp256k1 (BIP-340) | 32 bytes x-only | yes |
//! | Ecdsa | secp256k1 | 33 bytes compressed | no |
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Determinism | Same seed, path and scheme always give the same key |
//! | 2 | Public Handles | A `KeyHandle` never carries a seed or secret |
//! | 3 | Scoped Secrets | Seed phrases and secrets are zeroized when the call returns |
//! | 4 | Matching Unlock | `sign` fails with `WrongSecret` unless the unlock reproduces the key |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Path grammar, derivation steps, key ring
//! - `ports/` - Port traits (inbound API, outbound seed source)
//! - `service.rs` - Application service implementing the API

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use domain::config::SigningConfig;
pub use domain::derivation::{derive_secret, hard_step, root_secret, soft_step, Secret};
pub use domain::entities::{KeyHandle, KeyRing, Signature, UnlockContext};
pub use domain::errors::{PathError, SignError};
pub use domain::path::{DerivationPath, Junction, SecretPath};
pub use ports::inbound::SignatureEngineApi;
pub use ports::outbound::{InMemorySeedSource, SeedSource, SeedSourceError};
pub use service::SignatureEngineService;
