//! # Shared Crypto - Vault Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | BLAKE3 | Digests, keyed derivation steps |
//! | `ed25519` | Ed25519 | Scheme A keys |
//! | `schnorr` | BIP-340 over secp256k1 | Scheme B keys, soft derivation tweaks |
//! | `ecdsa` | ECDSA secp256k1 | Scheme C keys |
//! | `multi` | dispatch | Scheme-agnostic sign / verify |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency
//! - **secp256k1 ECDSA**: RFC 6979 deterministic, low-S normalization
//! - **Key pairs** wipe their secret scalar on drop; derived secrets are
//!   returned as `Zeroizing` buffers

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod ecdsa;
pub mod ed25519;
pub mod errors;
pub mod hashing;
pub mod multi;
pub mod schnorr;

// Re-exports
pub use ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey};
pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey};
pub use errors::CryptoError;
pub use hashing::{
    blake3_derive_key, blake3_hash, blake3_hash_many, blake3_keyed_hash, blake3_keyed_hash_many,
};
pub use multi::{keys_match, public_key_from_secret, sign_with_secret, verify_signature};
pub use schnorr::{tweak_add_secret, SchnorrKeyPair, SchnorrPublicKey};
