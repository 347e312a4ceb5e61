//! # Metadata Registry Service
//!
//! Application service implementing `MetadataRegistryApi`.
//!
//! ## Architecture
//!
//! - Holds `RegistryState` and the store behind one `RwLock`; `accept` takes
//!   the write lock for the whole check-persist-apply sequence, so there is
//!   exactly one writer at a time
//! - Checks candidate signatures through the `SignatureChecker` port before
//!   the pinning rules run
//! - Appends every accepted change, every removal and every trust rejection
//!   to the history log

use crate::domain::entities::{
    Accepted, LoadedMetadata, NetworkPin, PinTransition, Removal, UpdatePlan,
};
use crate::domain::errors::{RegistryError, TrustViolation};
use crate::domain::state::RegistryState;
use crate::ports::inbound::MetadataRegistryApi;
use crate::ports::outbound::{
    DefaultSignatureChecker, HistoryLog, InMemoryHistoryLog, InMemoryRegistryStore,
    RegistryStore, SignatureChecker,
};
use parking_lot::RwLock;
use shared_types::{
    CandidateContent, GenesisHash, HistoryEvent, NetworkSpecs, UpdateCandidate, Verifier,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

struct Inner<S> {
    state: RegistryState,
    store: S,
}

/// The Metadata Registry Service.
pub struct MetadataRegistryService<S, H, C>
where
    S: RegistryStore,
    H: HistoryLog,
    C: SignatureChecker,
{
    inner: RwLock<Inner<S>>,
    history: H,
    checker: C,
}

impl<S, H, C> MetadataRegistryService<S, H, C>
where
    S: RegistryStore,
    H: HistoryLog,
    C: SignatureChecker,
{
    /// Create the service, loading everything the store holds.
    pub fn new(store: S, history: H, checker: C) -> Result<Self, RegistryError> {
        let snapshot = store.load()?;
        let state = RegistryState::from_snapshot(snapshot)?;
        info!(networks = state.networks().len(), "Metadata registry loaded");
        Ok(Self {
            inner: RwLock::new(Inner { state, store }),
            history,
            checker,
        })
    }

    /// Set the vault-wide general verifier. Networks pinned to it follow.
    pub fn with_general_verifier(mut self, verifier: Verifier) -> Self {
        info!(general_verifier = %verifier, "General verifier set");
        self.inner.get_mut().state.set_general_verifier(verifier);
        self
    }

    /// Check the candidate's signature, if it carries one.
    fn check_signature(&self, candidate: &UpdateCandidate) -> Result<(), RegistryError> {
        let Some(signed) = &candidate.signed_by else {
            return Ok(());
        };
        if self
            .checker
            .verify(&signed.signer, &candidate.signed_message, &signed.signature)
        {
            Ok(())
        } else {
            Err(TrustViolation::BadSignature {
                signer: signed.signer.clone(),
            }
            .into())
        }
    }

    fn record_accepted(&self, plan: &UpdatePlan, candidate: &UpdateCandidate) {
        match &candidate.content {
            CandidateContent::NetworkSpecs(specs) => {
                self.history.append(HistoryEvent::NetworkSpecsAdded {
                    genesis_hash: specs.genesis_hash,
                    name: specs.name.clone(),
                    verifier: plan.verifier.clone(),
                })
            }
            CandidateContent::Metadata {
                genesis_hash,
                name,
                spec_version,
                ..
            } => self.history.append(HistoryEvent::MetadataAdded {
                genesis_hash: *genesis_hash,
                name: name.clone(),
                spec_version: *spec_version,
                verifier: plan.verifier.clone(),
            }),
        }
        if let PinTransition::Upgrade(_) = &plan.pin {
            self.history.append(HistoryEvent::VerifierUpgraded {
                genesis_hash: plan.genesis_hash,
                verifier: plan.verifier.clone(),
            });
        }
    }

    /// Plan a removal under the write lock, persist it, then apply it.
    fn remove<F>(&self, plan: F) -> Result<Removal, RegistryError>
    where
        F: FnOnce(&RegistryState) -> Result<Removal, RegistryError>,
    {
        let removal = {
            let mut inner = self.inner.write();
            let removal = plan(&inner.state)?;
            inner.store.atomic_batch_write(&removal.writes)?;
            inner.state.apply_writes(&removal.writes)?;
            removal
        };

        for &spec_version in &removal.spec_versions {
            self.history.append(HistoryEvent::MetadataRemoved {
                genesis_hash: removal.genesis_hash,
                name: removal.network_name.clone(),
                spec_version,
            });
        }
        if removal.specs_removed {
            self.history.append(HistoryEvent::NetworkRemoved {
                genesis_hash: removal.genesis_hash,
                name: removal.network_name.clone(),
                disabled: removal.disabled,
            });
        }
        info!(
            network = %removal.network_name,
            versions = ?removal.spec_versions,
            specs = removal.specs_removed,
            disabled = removal.disabled,
            "Registry content removed"
        );
        Ok(removal)
    }
}

impl
    MetadataRegistryService<InMemoryRegistryStore, Arc<InMemoryHistoryLog>, DefaultSignatureChecker>
{
    /// Service over in-memory adapters, sharing `history` with the caller.
    pub fn in_memory(history: Arc<InMemoryHistoryLog>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                state: RegistryState::default(),
                store: InMemoryRegistryStore::new(),
            }),
            history,
            checker: DefaultSignatureChecker,
        }
    }
}

impl<S, H, C> MetadataRegistryApi for MetadataRegistryService<S, H, C>
where
    S: RegistryStore,
    H: HistoryLog,
    C: SignatureChecker,
{
    fn lookup(
        &self,
        genesis_hash: &GenesisHash,
        spec_version: u32,
    ) -> Result<Arc<LoadedMetadata>, RegistryError> {
        self.inner
            .read()
            .state
            .metadata(genesis_hash, spec_version)
            .ok_or_else(|| RegistryError::NotFound {
                genesis_hash: hex::encode(genesis_hash),
                spec_version,
            })
    }

    fn latest_metadata(&self, genesis_hash: &GenesisHash) -> Option<Arc<LoadedMetadata>> {
        self.inner.read().state.latest_metadata(genesis_hash)
    }

    fn metadata_versions(&self, genesis_hash: &GenesisHash) -> Vec<u32> {
        self.inner.read().state.metadata_versions(genesis_hash)
    }

    fn network_specs(&self, genesis_hash: &GenesisHash) -> Option<NetworkSpecs> {
        self.inner.read().state.specs(genesis_hash).cloned()
    }

    fn networks(&self) -> Vec<NetworkSpecs> {
        self.inner.read().state.networks()
    }

    fn verifier(&self, genesis_hash: &GenesisHash) -> Option<Verifier> {
        self.inner.read().state.verifier(genesis_hash)
    }

    fn pin(&self, genesis_hash: &GenesisHash) -> Option<NetworkPin> {
        self.inner.read().state.pin(genesis_hash).cloned()
    }

    fn general_verifier(&self) -> Verifier {
        self.inner.read().state.general_verifier().clone()
    }

    fn evaluate(&self, candidate: &UpdateCandidate) -> Result<UpdatePlan, RegistryError> {
        self.check_signature(candidate)?;
        let plan = self.inner.read().state.plan(candidate)?;
        debug!(
            kind = ?plan.kind,
            network = %plan.network_name,
            writes = plan.writes.len(),
            "Update evaluated"
        );
        Ok(plan)
    }

    fn accept(&self, candidate: &UpdateCandidate) -> Result<Accepted, RegistryError> {
        let genesis_hash = candidate.genesis_hash();
        let result = self.check_signature(candidate).and_then(|()| {
            let mut inner = self.inner.write();
            let plan = inner.state.plan(candidate)?;
            inner.store.atomic_batch_write(&plan.writes)?;
            inner.state.apply(&plan)?;
            Ok(plan)
        });

        match result {
            Ok(plan) => {
                info!(
                    kind = ?plan.kind,
                    network = %plan.network_name,
                    spec_version = ?plan.spec_version,
                    verifier = %plan.verifier,
                    "Update accepted"
                );
                self.record_accepted(&plan, candidate);
                Ok(plan)
            }
            Err(e) => {
                warn!(
                    genesis_hash = %hex::encode(genesis_hash),
                    error = %e,
                    "Update rejected"
                );
                if e.is_trust_violation() {
                    self.history.append(HistoryEvent::UpdateRejected {
                        genesis_hash,
                        reason: e.to_string(),
                    });
                }
                Err(e)
            }
        }
    }

    fn remove_network(&self, genesis_hash: &GenesisHash) -> Result<Removal, RegistryError> {
        self.remove(|state| state.plan_network_removal(genesis_hash))
    }

    fn remove_metadata(
        &self,
        genesis_hash: &GenesisHash,
        spec_version: u32,
    ) -> Result<Removal, RegistryError> {
        self.remove(|state| state.plan_metadata_removal(genesis_hash, spec_version))
    }
}
