//! # Outbound Ports (Driven Ports)
//!
//! The decoder reads network specs, metadata and verifier pins through
//! `MetadataLookup`. The runtime bridges it to the metadata registry; the
//! in-memory adapter below serves tests and standalone use.

use parking_lot::RwLock;
use shared_types::{GenesisHash, NetworkSpecs, RuntimeMetadata, Verifier};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Read access to everything the decoder resolves against.
pub trait MetadataLookup: Send + Sync {
    /// Specs of a network.
    fn network_specs(&self, genesis_hash: &GenesisHash) -> Option<NetworkSpecs>;

    /// Parsed metadata for an exact version.
    fn metadata(
        &self,
        genesis_hash: &GenesisHash,
        spec_version: u32,
    ) -> Option<Arc<RuntimeMetadata>>;

    /// Newest metadata version known for a network.
    fn latest_version(&self, genesis_hash: &GenesisHash) -> Option<u32>;

    /// Verifier pinned for a network.
    fn verifier(&self, genesis_hash: &GenesisHash) -> Option<Verifier>;
}

// =============================================================================
// ADAPTER IMPLEMENTATIONS
// =============================================================================

#[derive(Default)]
struct Tables {
    specs: BTreeMap<GenesisHash, (NetworkSpecs, Verifier)>,
    metadata: BTreeMap<(GenesisHash, u32), Arc<RuntimeMetadata>>,
}

/// In-memory lookup.
#[derive(Default)]
pub struct InMemoryMetadataLookup {
    tables: RwLock<Tables>,
}

impl InMemoryMetadataLookup {
    /// Empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a network.
    pub fn add_network(&self, specs: NetworkSpecs, verifier: Verifier) {
        self.tables
            .write()
            .specs
            .insert(specs.genesis_hash, (specs, verifier));
    }

    /// Register metadata for a network.
    pub fn add_metadata(&self, genesis_hash: GenesisHash, metadata: RuntimeMetadata) {
        self.tables
            .write()
            .metadata
            .insert((genesis_hash, metadata.spec_version), Arc::new(metadata));
    }
}

impl MetadataLookup for InMemoryMetadataLookup {
    fn network_specs(&self, genesis_hash: &GenesisHash) -> Option<NetworkSpecs> {
        self.tables
            .read()
            .specs
            .get(genesis_hash)
            .map(|(specs, _)| specs.clone())
    }

    fn metadata(
        &self,
        genesis_hash: &GenesisHash,
        spec_version: u32,
    ) -> Option<Arc<RuntimeMetadata>> {
        self.tables
            .read()
            .metadata
            .get(&(*genesis_hash, spec_version))
            .cloned()
    }

    fn latest_version(&self, genesis_hash: &GenesisHash) -> Option<u32> {
        self.tables
            .read()
            .metadata
            .range((*genesis_hash, 0)..=(*genesis_hash, u32::MAX))
            .next_back()
            .map(|((_, version), _)| *version)
    }

    fn verifier(&self, genesis_hash: &GenesisHash) -> Option<Verifier> {
        self.tables
            .read()
            .specs
            .get(genesis_hash)
            .map(|(_, verifier)| verifier.clone())
    }
}
