//! # Registry Entities
//!
//! Records held by the registry and the plan produced when a candidate is
//! evaluated.

use serde::{Deserialize, Serialize};
use shared_types::{
    GenesisHash, MetadataRecord, NetworkSpecs, RuntimeMetadata, UpdateKind, Verifier,
};

/// A stored metadata version together with its parsed type registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedMetadata {
    /// Stored record, blob kept verbatim.
    pub record: MetadataRecord,
    /// Parsed form of `record.blob`.
    pub runtime: RuntimeMetadata,
}

/// Who may update a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkPin {
    /// Follows the vault-wide general verifier.
    General,
    /// Verified by its own key, or by nobody yet.
    Custom(Verifier),
    /// Removed while pinned to a custom key. Every later update is refused.
    Dead,
}

impl NetworkPin {
    /// Verifier in effect, given the general verifier. `None` once dead.
    pub fn resolve(&self, general: &Verifier) -> Option<Verifier> {
        match self {
            NetworkPin::General => Some(general.clone()),
            NetworkPin::Custom(verifier) => Some(verifier.clone()),
            NetworkPin::Dead => None,
        }
    }

    /// What removing the network leaves behind: a custom key survives the
    /// removal as a dead pin, anything else stays as it was.
    pub fn after_removal(&self) -> NetworkPin {
        match self {
            NetworkPin::Custom(verifier) if verifier.is_pinned() => NetworkPin::Dead,
            other => other.clone(),
        }
    }
}

/// How a network's verifier pin changes when a candidate is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinTransition {
    /// First record for the network; the pin is created.
    Establish(NetworkPin),
    /// The pin stays as it is.
    Keep,
    /// An unverified network gains a verifier.
    Upgrade(NetworkPin),
}

/// Non-fatal notes attached to an accepted update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryWarning {
    /// The update is unsigned; its origin cannot be checked.
    NotVerified,
    /// The network's verifier is being set for the first time.
    VerifierUpgraded,
    /// The network is new to this vault.
    NewNetwork,
    /// The content was already stored; only the pin changes.
    ContentAlreadyKnown,
}

/// A single state change applied on accept or removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryWrite {
    /// Insert or replace network specs.
    Specs(NetworkSpecs),
    /// Insert a metadata version.
    Metadata(MetadataRecord),
    /// Set the verifier pin.
    Verifier {
        genesis_hash: GenesisHash,
        pin: NetworkPin,
    },
    /// Drop network specs.
    RemoveSpecs(GenesisHash),
    /// Drop one metadata version.
    RemoveMetadata {
        genesis_hash: GenesisHash,
        spec_version: u32,
    },
}

/// Outcome of evaluating a candidate: what accepting it would change.
///
/// `evaluate` returns it without side effects; `accept` returns the plan it
/// applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePlan {
    /// Requested operation.
    pub kind: UpdateKind,
    /// Target network.
    pub genesis_hash: GenesisHash,
    /// Target network name.
    pub network_name: String,
    /// Metadata version, for metadata candidates.
    pub spec_version: Option<u32>,
    /// Verifier the candidate carries.
    pub verifier: Verifier,
    /// Effect on the pin.
    pub pin: PinTransition,
    /// Warnings to show before approval.
    pub warnings: Vec<RegistryWarning>,
    /// Writes applied on accept, in order.
    pub writes: Vec<RegistryWrite>,
}

/// Result of a successful `accept`.
pub type Accepted = UpdatePlan;

/// What a removal took out of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    /// Target network.
    pub genesis_hash: GenesisHash,
    /// Target network name.
    pub network_name: String,
    /// Whether the network specs went too.
    pub specs_removed: bool,
    /// Metadata versions removed, ascending.
    pub spec_versions: Vec<u32>,
    /// Whether the network can no longer be re-added.
    pub disabled: bool,
    /// Writes applied, in order.
    pub writes: Vec<RegistryWrite>,
}

/// Full persisted registry content, loaded at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    /// All network specs.
    pub specs: Vec<NetworkSpecs>,
    /// All metadata records.
    pub metadata: Vec<MetadataRecord>,
    /// All verifier pins.
    pub verifiers: Vec<(GenesisHash, NetworkPin)>,
    /// Vault-wide verifier for networks pinned to `NetworkPin::General`.
    pub general_verifier: Verifier,
}
