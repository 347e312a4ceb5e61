//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this subsystem.

use crate::domain::entities::{Accepted, LoadedMetadata, NetworkPin, Removal, UpdatePlan};
use crate::domain::errors::RegistryError;
use shared_types::{GenesisHash, NetworkSpecs, UpdateCandidate, Verifier};
use std::sync::Arc;

/// Primary Metadata Registry API.
///
/// Reads are unrestricted; `accept` and the removals are the only mutations
/// and are serialized internally. Implementations must be thread-safe (`Send + Sync`).
pub trait MetadataRegistryApi: Send + Sync {
    // =========================================================================
    // Reads
    // =========================================================================

    /// Metadata for an exact network and version.
    ///
    /// # Errors
    /// `RegistryError::NotFound` when that version was never accepted.
    fn lookup(
        &self,
        genesis_hash: &GenesisHash,
        spec_version: u32,
    ) -> Result<Arc<LoadedMetadata>, RegistryError>;

    /// Newest stored metadata of a network.
    fn latest_metadata(&self, genesis_hash: &GenesisHash) -> Option<Arc<LoadedMetadata>>;

    /// Stored versions of a network, ascending.
    fn metadata_versions(&self, genesis_hash: &GenesisHash) -> Vec<u32>;

    /// Specs of a network.
    fn network_specs(&self, genesis_hash: &GenesisHash) -> Option<NetworkSpecs>;

    /// All known networks.
    fn networks(&self) -> Vec<NetworkSpecs>;

    /// Verifier in effect for a network; `None` when the network is unknown
    /// or disabled.
    fn verifier(&self, genesis_hash: &GenesisHash) -> Option<Verifier>;

    /// Raw pin of a network. Survives removal of the network.
    fn pin(&self, genesis_hash: &GenesisHash) -> Option<NetworkPin>;

    /// Vault-wide general verifier.
    fn general_verifier(&self) -> Verifier;

    // =========================================================================
    // Updates
    // =========================================================================

    /// Dry run: check signature and rules, report what `accept` would do.
    fn evaluate(&self, candidate: &UpdateCandidate) -> Result<UpdatePlan, RegistryError>;

    /// Check and apply an update, persist it and append it to the history log.
    fn accept(&self, candidate: &UpdateCandidate) -> Result<Accepted, RegistryError>;

    // =========================================================================
    // Removal
    // =========================================================================

    /// Remove a network with all of its metadata. A network pinned to a
    /// custom key is disabled for good.
    ///
    /// # Errors
    /// `RegistryError::UnknownNetwork` when no specs are stored.
    fn remove_network(&self, genesis_hash: &GenesisHash) -> Result<Removal, RegistryError>;

    /// Remove one metadata version.
    ///
    /// # Errors
    /// `RegistryError::NotFound` when that version is not stored.
    fn remove_metadata(
        &self,
        genesis_hash: &GenesisHash,
        spec_version: u32,
    ) -> Result<Removal, RegistryError>;
}
