//! # Outbound Ports (Driven Ports)
//!
//! Seed phrases live in external secure storage. The engine only ever holds
//! them for the duration of a single derivation.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use thiserror::Error;
use zeroize::Zeroizing;

/// Error from seed storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SeedSourceError {
    /// Storage is locked or unavailable.
    #[error("Seed storage unavailable: {0}")]
    Unavailable(String),
}

/// Access to stored seed phrases.
pub trait SeedSource: Send + Sync {
    /// Phrase for a seed, `None` if no such seed exists.
    fn seed_phrase(&self, seed_name: &str) -> Result<Option<Zeroizing<String>>, SeedSourceError>;

    /// Names of all stored seeds.
    fn seed_names(&self) -> Vec<String>;
}

// =============================================================================
// ADAPTER IMPLEMENTATIONS
// =============================================================================

/// In-memory seed storage for tests and the default runtime.
#[derive(Default)]
pub struct InMemorySeedSource {
    seeds: RwLock<BTreeMap<String, Zeroizing<String>>>,
}

impl InMemorySeedSource {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a seed, replacing any seed with the same name.
    pub fn add_seed(&self, seed_name: impl Into<String>, phrase: impl Into<String>) {
        self.seeds
            .write()
            .insert(seed_name.into(), Zeroizing::new(phrase.into()));
    }

    /// Remove a seed. Returns `true` if it existed.
    pub fn remove_seed(&self, seed_name: &str) -> bool {
        self.seeds.write().remove(seed_name).is_some()
    }
}

impl SeedSource for InMemorySeedSource {
    fn seed_phrase(&self, seed_name: &str) -> Result<Option<Zeroizing<String>>, SeedSourceError> {
        Ok(self.seeds.read().get(seed_name).cloned())
    }

    fn seed_names(&self) -> Vec<String> {
        self.seeds.read().keys().cloned().collect()
    }
}

impl<T: SeedSource + ?Sized> SeedSource for std::sync::Arc<T> {
    fn seed_phrase(&self, seed_name: &str) -> Result<Option<Zeroizing<String>>, SeedSourceError> {
        (**self).seed_phrase(seed_name)
    }

    fn seed_names(&self) -> Vec<String> {
        (**self).seed_names()
    }
}
