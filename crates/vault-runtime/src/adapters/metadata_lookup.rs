//! Decoder lookups answered by the metadata registry.

use cv_01_metadata_registry::MetadataRegistryApi;
use cv_03_payload_decoder::MetadataLookup;
use parking_lot::Mutex;
use shared_types::{GenesisHash, NetworkSpecs, RuntimeMetadata, Verifier};
use std::collections::HashMap;
use std::sync::Arc;

/// `MetadataLookup` over the registry.
///
/// Parsed metadata is cached per `(genesis, version)`; stored versions are
/// immutable, so cached entries never go stale.
pub struct RegistryLookup<R: MetadataRegistryApi + ?Sized> {
    registry: Arc<R>,
    parsed: Mutex<HashMap<(GenesisHash, u32), Arc<RuntimeMetadata>>>,
}

impl<R: MetadataRegistryApi + ?Sized> RegistryLookup<R> {
    /// Lookup over `registry`.
    pub fn new(registry: Arc<R>) -> Self {
        Self {
            registry,
            parsed: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached metadata versions.
    pub fn cached(&self) -> usize {
        self.parsed.lock().len()
    }
}

impl<R: MetadataRegistryApi + ?Sized> MetadataLookup for RegistryLookup<R> {
    fn network_specs(&self, genesis_hash: &GenesisHash) -> Option<NetworkSpecs> {
        self.registry.network_specs(genesis_hash)
    }

    fn metadata(
        &self,
        genesis_hash: &GenesisHash,
        spec_version: u32,
    ) -> Option<Arc<RuntimeMetadata>> {
        let key = (*genesis_hash, spec_version);
        if let Some(hit) = self.parsed.lock().get(&key) {
            return Some(Arc::clone(hit));
        }
        let loaded = self.registry.lookup(genesis_hash, spec_version).ok()?;
        let runtime = Arc::new(loaded.runtime.clone());
        self.parsed.lock().insert(key, Arc::clone(&runtime));
        Some(runtime)
    }

    fn latest_version(&self, genesis_hash: &GenesisHash) -> Option<u32> {
        self.registry.metadata_versions(genesis_hash).last().copied()
    }

    fn verifier(&self, genesis_hash: &GenesisHash) -> Option<Verifier> {
        self.registry.verifier(genesis_hash)
    }
}
