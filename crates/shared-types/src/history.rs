//! # History Events
//!
//! Entries of the append-only audit log. Storage is external; subsystems only
//! produce events.

use crate::entities::{GenesisHash, Hash, MultiSigner, Verifier};
use serde::{Deserialize, Serialize};

/// Something worth recording in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// Network specs were added.
    NetworkSpecsAdded {
        genesis_hash: GenesisHash,
        name: String,
        verifier: Verifier,
    },
    /// A metadata version was added.
    MetadataAdded {
        genesis_hash: GenesisHash,
        name: String,
        spec_version: u32,
        verifier: Verifier,
    },
    /// A network's verifier pin moved from `None` to a concrete key.
    VerifierUpgraded {
        genesis_hash: GenesisHash,
        verifier: Verifier,
    },
    /// A network was removed together with all of its metadata. `disabled`
    /// is set when the network can no longer be re-added.
    NetworkRemoved {
        genesis_hash: GenesisHash,
        name: String,
        disabled: bool,
    },
    /// One metadata version was removed.
    MetadataRemoved {
        genesis_hash: GenesisHash,
        name: String,
        spec_version: u32,
    },
    /// An update was rejected.
    UpdateRejected {
        genesis_hash: GenesisHash,
        reason: String,
    },
    /// A transaction was signed.
    TransactionSigned {
        genesis_hash: GenesisHash,
        signer: MultiSigner,
        digest: Hash,
    },
    /// A text message was signed.
    MessageSigned {
        genesis_hash: GenesisHash,
        signer: MultiSigner,
        message: String,
    },
    /// A signing attempt failed.
    SignFailed {
        genesis_hash: GenesisHash,
        signer: MultiSigner,
        reason: String,
    },
    /// A key was derived and added to the key ring.
    KeyDerived {
        seed_name: String,
        path: String,
        signer: MultiSigner,
    },
}

impl HistoryEvent {
    /// Short label for list rendering.
    pub fn label(&self) -> &'static str {
        match self {
            HistoryEvent::NetworkSpecsAdded { .. } => "Network added",
            HistoryEvent::MetadataAdded { .. } => "Metadata added",
            HistoryEvent::VerifierUpgraded { .. } => "Verifier set",
            HistoryEvent::NetworkRemoved { .. } => "Network removed",
            HistoryEvent::MetadataRemoved { .. } => "Metadata removed",
            HistoryEvent::UpdateRejected { .. } => "Update rejected",
            HistoryEvent::TransactionSigned { .. } => "Transaction signed",
            HistoryEvent::MessageSigned { .. } => "Message signed",
            HistoryEvent::SignFailed { .. } => "Signing failed",
            HistoryEvent::KeyDerived { .. } => "Key derived",
        }
    }
}

/// A stored log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Monotonic position in the log.
    pub order: u32,
    /// Unix seconds.
    pub timestamp: u64,
    /// What happened.
    pub event: HistoryEvent,
}
