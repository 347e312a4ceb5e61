//! # Domain Errors
//!
//! Error types for the Metadata Registry subsystem.
//!
//! ## Design Principles
//!
//! - Trust violations are a separate enum so callers can render them as a
//!   blocking alert without string matching
//! - No panics in domain logic (use Result instead)

use shared_types::{MultiSigner, Verifier};
use thiserror::Error;

/// A candidate broke the verifier pinning rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrustViolation {
    /// The network is pinned to a verifier but the candidate is unsigned.
    #[error("Network is verified by {pinned}; unsigned update refused")]
    VerifierDisappeared { pinned: Verifier },

    /// The candidate is signed by a different key than the pinned verifier.
    #[error("Network is verified by {pinned}; update signed by {offered} refused")]
    VerifierChanged { pinned: Verifier, offered: Verifier },

    /// The network was removed while pinned to a custom verifier.
    #[error("Network was removed while verified by a custom key and is disabled")]
    NetworkDisabled,

    /// The attached signature does not verify.
    #[error("Signature by {signer} does not match the update")]
    BadSignature { signer: MultiSigner },
}

/// Errors returned by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No metadata stored for this network and version.
    #[error("No metadata for network {genesis_hash} version {spec_version}")]
    NotFound {
        genesis_hash: String,
        spec_version: u32,
    },

    /// Metadata was offered for a network whose specs are unknown.
    #[error("Unknown network {0}; add its specs first")]
    UnknownNetwork(String),

    /// The update breaks the verifier pinning rules.
    #[error("Trust violation: {0}")]
    Trust(#[from] TrustViolation),

    /// Identical content is already stored.
    #[error("Already known: {0}")]
    AlreadyKnown(String),

    /// Different bytes were offered for a stored metadata version.
    #[error("Metadata {name} version {spec_version} is already stored with different content")]
    MetadataMismatch { name: String, spec_version: u32 },

    /// The metadata blob names a different runtime than the network specs.
    #[error("Metadata is for {found}, network is {expected}")]
    NameMismatch { expected: String, found: String },

    /// Specs conflict with the stored specs of the same network.
    #[error("Network specs conflict: {0}")]
    SpecsConflict(String),

    /// The metadata blob does not parse.
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    /// The backing store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RegistryError {
    /// Whether this rejection must be shown as a blocking trust alert.
    pub fn is_trust_violation(&self) -> bool {
        matches!(self, RegistryError::Trust(_))
    }
}

/// Errors raised by a `RegistryStore` adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Store error: {message}")]
pub struct StoreError {
    /// Adapter-specific description.
    pub message: String,
}

impl From<StoreError> for RegistryError {
    fn from(e: StoreError) -> Self {
        RegistryError::Storage(e.message)
    }
}
