//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the Metadata Registry service.
//!
//! These are the interfaces the host application implements. In-memory and
//! default adapters are provided below for tests and for hosts without
//! persistent storage.

use crate::domain::entities::{NetworkPin, RegistrySnapshot, RegistryWrite};
use crate::domain::errors::StoreError;
use parking_lot::Mutex;
use shared_types::{
    GenesisHash, HistoryEntry, HistoryEvent, MetadataRecord, MultiSigner, NetworkSpecs,
    Verifier,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Persistence for registry content.
///
/// Metadata is keyed by `(genesis_hash, spec_version)`; specs and verifier
/// pins by `genesis_hash`.
pub trait RegistryStore: Send + Sync {
    /// Load everything persisted so far.
    fn load(&self) -> Result<RegistrySnapshot, StoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL writes in the batch are applied, or NONE are.
    fn atomic_batch_write(&mut self, writes: &[RegistryWrite]) -> Result<(), StoreError>;
}

/// Append-only audit log.
pub trait HistoryLog: Send + Sync {
    /// Append an event.
    fn append(&self, event: HistoryEvent);
}

/// Signature verification for signed candidates.
pub trait SignatureChecker: Send + Sync {
    /// Whether `signature` by `signer` covers `message`.
    fn verify(&self, signer: &MultiSigner, message: &[u8], signature: &[u8]) -> bool;
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Get current timestamp in seconds since epoch.
    fn now(&self) -> u64;
}

impl<T: HistoryLog + ?Sized> HistoryLog for Arc<T> {
    fn append(&self, event: HistoryEvent) {
        (**self).append(event)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

// =============================================================================
// ADAPTER IMPLEMENTATIONS
// =============================================================================

/// Default signature checker backed by `shared-crypto`.
#[derive(Default, Clone, Copy)]
pub struct DefaultSignatureChecker;

impl SignatureChecker for DefaultSignatureChecker {
    fn verify(&self, signer: &MultiSigner, message: &[u8], signature: &[u8]) -> bool {
        shared_crypto::verify_signature(signer, message, signature).is_ok()
    }
}

/// Default time source using system time.
#[derive(Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// In-memory registry store.
#[derive(Default)]
pub struct InMemoryRegistryStore {
    specs: BTreeMap<GenesisHash, NetworkSpecs>,
    metadata: BTreeMap<(GenesisHash, u32), MetadataRecord>,
    verifiers: BTreeMap<GenesisHash, NetworkPin>,
    general_verifier: Verifier,
}

impl InMemoryRegistryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated from a snapshot.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        let mut store = Self::default();
        for specs in snapshot.specs {
            store.specs.insert(specs.genesis_hash, specs);
        }
        for record in snapshot.metadata {
            store
                .metadata
                .insert((record.genesis_hash, record.spec_version), record);
        }
        store.verifiers.extend(snapshot.verifiers);
        store.general_verifier = snapshot.general_verifier;
        store
    }

    /// Number of stored metadata records.
    pub fn metadata_count(&self) -> usize {
        self.metadata.len()
    }
}

impl RegistryStore for InMemoryRegistryStore {
    fn load(&self) -> Result<RegistrySnapshot, StoreError> {
        Ok(RegistrySnapshot {
            specs: self.specs.values().cloned().collect(),
            metadata: self.metadata.values().cloned().collect(),
            verifiers: self
                .verifiers
                .iter()
                .map(|(genesis, pin)| (*genesis, pin.clone()))
                .collect(),
            general_verifier: self.general_verifier.clone(),
        })
    }

    fn atomic_batch_write(&mut self, writes: &[RegistryWrite]) -> Result<(), StoreError> {
        // Single-threaded maps: applying in order is atomic from the caller's view.
        for write in writes {
            match write {
                RegistryWrite::Specs(specs) => {
                    self.specs.insert(specs.genesis_hash, specs.clone());
                }
                RegistryWrite::Metadata(record) => {
                    self.metadata
                        .insert((record.genesis_hash, record.spec_version), record.clone());
                }
                RegistryWrite::Verifier { genesis_hash, pin } => {
                    self.verifiers.insert(*genesis_hash, pin.clone());
                }
                RegistryWrite::RemoveSpecs(genesis_hash) => {
                    self.specs.remove(genesis_hash);
                }
                RegistryWrite::RemoveMetadata {
                    genesis_hash,
                    spec_version,
                } => {
                    self.metadata.remove(&(*genesis_hash, *spec_version));
                }
            }
        }
        Ok(())
    }
}

/// In-memory history log with monotonic ordering.
pub struct InMemoryHistoryLog<T: TimeSource = SystemTimeSource> {
    entries: Mutex<Vec<HistoryEntry>>,
    time_source: T,
}

impl InMemoryHistoryLog<SystemTimeSource> {
    /// Log stamped with system time.
    pub fn new() -> Self {
        Self::with_time_source(SystemTimeSource)
    }
}

impl Default for InMemoryHistoryLog<SystemTimeSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeSource> InMemoryHistoryLog<T> {
    /// Log stamped by `time_source`.
    pub fn with_time_source(time_source: T) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            time_source,
        }
    }

    /// Copy of all entries, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().clone()
    }

    /// Entry at a given position.
    pub fn entry(&self, order: u32) -> Option<HistoryEntry> {
        self.entries.lock().get(order as usize).cloned()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: TimeSource> HistoryLog for InMemoryHistoryLog<T> {
    fn append(&self, event: HistoryEvent) {
        let timestamp = self.time_source.now();
        let mut entries = self.entries.lock();
        let order = entries.len() as u32;
        entries.push(HistoryEntry {
            order,
            timestamp,
            event,
        });
    }
}
