//! # Registry State
//!
//! In-memory view of every network the vault knows. Planning an update is a
//! pure read of this state; applying a plan is the only mutation.
//!
//! ## Invariants
//!
//! - At most one metadata record per `(genesis_hash, spec_version)`; a stored
//!   record is never replaced.
//! - Metadata exists only for networks whose specs are known; removing a
//!   network removes all of its metadata.
//! - A pin survives the removal of its network. A custom key turns into
//!   `NetworkPin::Dead` and the network cannot be re-added.
//! - Iteration order is deterministic (`BTreeMap`).

use crate::domain::entities::{
    LoadedMetadata, NetworkPin, PinTransition, RegistrySnapshot, RegistryWarning, RegistryWrite,
    Removal, UpdatePlan,
};
use crate::domain::errors::{RegistryError, TrustViolation};
use crate::domain::trust::check_pin;
use shared_types::{
    CandidateContent, GenesisHash, MetadataRecord, NetworkSpecs, RuntimeMetadata, UpdateCandidate,
    UpdateKind, Verifier,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// All registry content.
#[derive(Debug, Default, Clone)]
pub struct RegistryState {
    specs: BTreeMap<GenesisHash, NetworkSpecs>,
    verifiers: BTreeMap<GenesisHash, NetworkPin>,
    metadata: BTreeMap<(GenesisHash, u32), Arc<LoadedMetadata>>,
    general_verifier: Verifier,
}

impl RegistryState {
    /// Rebuild state from a persisted snapshot, re-parsing every blob.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Result<Self, RegistryError> {
        let mut state = Self {
            general_verifier: snapshot.general_verifier,
            ..Self::default()
        };
        for specs in snapshot.specs {
            state.specs.insert(specs.genesis_hash, specs);
        }
        for (genesis_hash, pin) in snapshot.verifiers {
            state.verifiers.insert(genesis_hash, pin);
        }
        for record in snapshot.metadata {
            let loaded = load(record)?;
            let key = (loaded.record.genesis_hash, loaded.record.spec_version);
            state.metadata.insert(key, Arc::new(loaded));
        }
        Ok(state)
    }

    /// Work out what accepting `candidate` would change.
    ///
    /// The candidate's signature must already have been checked.
    pub fn plan(&self, candidate: &UpdateCandidate) -> Result<UpdatePlan, RegistryError> {
        if self.verifiers.get(&candidate.genesis_hash()) == Some(&NetworkPin::Dead) {
            return Err(TrustViolation::NetworkDisabled.into());
        }
        match &candidate.content {
            CandidateContent::Metadata {
                genesis_hash,
                name,
                spec_version,
                blob,
            } => self.plan_metadata(candidate, genesis_hash, name, *spec_version, blob),
            CandidateContent::NetworkSpecs(specs) => self.plan_specs(candidate, specs),
        }
    }

    fn plan_metadata(
        &self,
        candidate: &UpdateCandidate,
        genesis_hash: &GenesisHash,
        name: &str,
        spec_version: u32,
        blob: &[u8],
    ) -> Result<UpdatePlan, RegistryError> {
        let specs = self
            .specs
            .get(genesis_hash)
            .ok_or_else(|| RegistryError::UnknownNetwork(hex::encode(genesis_hash)))?;

        let runtime = RuntimeMetadata::decode(blob)
            .map_err(|e| RegistryError::InvalidMetadata(e.to_string()))?;
        if runtime.spec_version != spec_version || runtime.spec_name != name {
            return Err(RegistryError::InvalidMetadata(format!(
                "header declares {} version {}, candidate claims {} version {}",
                runtime.spec_name, runtime.spec_version, name, spec_version
            )));
        }
        if runtime.spec_name != specs.name {
            return Err(RegistryError::NameMismatch {
                expected: specs.name.clone(),
                found: runtime.spec_name,
            });
        }

        let claimed = candidate.claimed_verifier();
        let (pin, mut warnings) =
            check_pin(self.verifiers.get(genesis_hash), &self.general_verifier, &claimed)?;

        let mut writes = Vec::new();
        match self.metadata.get(&(*genesis_hash, spec_version)) {
            Some(existing) if existing.record.blob == blob => {
                if pin == PinTransition::Keep {
                    return Err(RegistryError::AlreadyKnown(format!(
                        "{name} version {spec_version}"
                    )));
                }
                warnings.push(RegistryWarning::ContentAlreadyKnown);
            }
            Some(_) => {
                return Err(RegistryError::MetadataMismatch {
                    name: name.to_string(),
                    spec_version,
                })
            }
            None => writes.push(RegistryWrite::Metadata(MetadataRecord {
                genesis_hash: *genesis_hash,
                name: name.to_string(),
                spec_version,
                blob: blob.to_vec(),
                verifier: claimed.clone(),
            })),
        }
        push_pin_write(&mut writes, genesis_hash, &pin);

        Ok(UpdatePlan {
            kind: UpdateKind::LoadMetadata,
            genesis_hash: *genesis_hash,
            network_name: specs.name.clone(),
            spec_version: Some(spec_version),
            verifier: claimed,
            pin,
            warnings,
            writes,
        })
    }

    fn plan_specs(
        &self,
        candidate: &UpdateCandidate,
        specs: &NetworkSpecs,
    ) -> Result<UpdatePlan, RegistryError> {
        let genesis_hash = specs.genesis_hash;
        let claimed = candidate.claimed_verifier();
        let (pin, mut warnings) =
            check_pin(self.verifiers.get(&genesis_hash), &self.general_verifier, &claimed)?;

        let mut writes = Vec::new();
        match self.specs.get(&genesis_hash) {
            Some(existing) if existing == specs => {
                if pin == PinTransition::Keep {
                    return Err(RegistryError::AlreadyKnown(format!(
                        "specs of {}",
                        specs.name
                    )));
                }
                warnings.push(RegistryWarning::ContentAlreadyKnown);
            }
            Some(existing) if existing.name != specs.name => {
                return Err(RegistryError::SpecsConflict(format!(
                    "network {} cannot be renamed to {}",
                    existing.name, specs.name
                )))
            }
            Some(existing) if existing.encryption != specs.encryption => {
                return Err(RegistryError::SpecsConflict(format!(
                    "network {} uses {}, update declares {}",
                    existing.name, existing.encryption, specs.encryption
                )))
            }
            _ => writes.push(RegistryWrite::Specs(specs.clone())),
        }
        push_pin_write(&mut writes, &genesis_hash, &pin);

        Ok(UpdatePlan {
            kind: UpdateKind::AddSpecs,
            genesis_hash,
            network_name: specs.name.clone(),
            spec_version: None,
            verifier: claimed,
            pin,
            warnings,
            writes,
        })
    }

    /// Work out what removing a network would change: its specs, every
    /// metadata version, and the pin if it held a custom key.
    pub fn plan_network_removal(
        &self,
        genesis_hash: &GenesisHash,
    ) -> Result<Removal, RegistryError> {
        let specs = self.known_specs(genesis_hash)?;
        let spec_versions = self.metadata_versions(genesis_hash);

        let mut writes: Vec<RegistryWrite> = spec_versions
            .iter()
            .map(|&spec_version| RegistryWrite::RemoveMetadata {
                genesis_hash: *genesis_hash,
                spec_version,
            })
            .collect();
        writes.push(RegistryWrite::RemoveSpecs(*genesis_hash));

        let mut disabled = false;
        if let Some(pin) = self.verifiers.get(genesis_hash) {
            let left = pin.after_removal();
            if &left != pin {
                disabled = left == NetworkPin::Dead;
                writes.push(RegistryWrite::Verifier {
                    genesis_hash: *genesis_hash,
                    pin: left,
                });
            }
        }

        Ok(Removal {
            genesis_hash: *genesis_hash,
            network_name: specs.name.clone(),
            specs_removed: true,
            spec_versions,
            disabled,
            writes,
        })
    }

    /// Work out what removing one metadata version would change. Specs and
    /// pin are untouched.
    pub fn plan_metadata_removal(
        &self,
        genesis_hash: &GenesisHash,
        spec_version: u32,
    ) -> Result<Removal, RegistryError> {
        let specs = self.known_specs(genesis_hash)?;
        if !self.metadata.contains_key(&(*genesis_hash, spec_version)) {
            return Err(RegistryError::NotFound {
                genesis_hash: hex::encode(genesis_hash),
                spec_version,
            });
        }
        Ok(Removal {
            genesis_hash: *genesis_hash,
            network_name: specs.name.clone(),
            specs_removed: false,
            spec_versions: vec![spec_version],
            disabled: false,
            writes: vec![RegistryWrite::RemoveMetadata {
                genesis_hash: *genesis_hash,
                spec_version,
            }],
        })
    }

    fn known_specs(&self, genesis_hash: &GenesisHash) -> Result<&NetworkSpecs, RegistryError> {
        self.specs
            .get(genesis_hash)
            .ok_or_else(|| RegistryError::UnknownNetwork(hex::encode(genesis_hash)))
    }

    /// Apply a plan produced by [`RegistryState::plan`]. All-or-nothing.
    pub fn apply(&mut self, plan: &UpdatePlan) -> Result<(), RegistryError> {
        self.apply_writes(&plan.writes)
    }

    /// Apply the writes of a plan or removal. All-or-nothing.
    pub fn apply_writes(&mut self, writes: &[RegistryWrite]) -> Result<(), RegistryError> {
        // Parse first so a bad blob leaves the state untouched.
        let mut loaded = Vec::new();
        for write in writes {
            if let RegistryWrite::Metadata(record) = write {
                loaded.push(Arc::new(load(record.clone())?));
            }
        }

        for write in writes {
            match write {
                RegistryWrite::Specs(specs) => {
                    self.specs.insert(specs.genesis_hash, specs.clone());
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
                RegistryWrite::Metadata(_) => {}
            }
        }
        for entry in loaded {
            let key = (entry.record.genesis_hash, entry.record.spec_version);
            self.metadata.insert(key, entry);
        }
        Ok(())
    }

    /// Metadata for a network and version.
    pub fn metadata(
        &self,
        genesis_hash: &GenesisHash,
        spec_version: u32,
    ) -> Option<Arc<LoadedMetadata>> {
        self.metadata.get(&(*genesis_hash, spec_version)).cloned()
    }

    /// Newest metadata version of a network.
    pub fn latest_metadata(&self, genesis_hash: &GenesisHash) -> Option<Arc<LoadedMetadata>> {
        self.metadata
            .range((*genesis_hash, 0)..=(*genesis_hash, u32::MAX))
            .next_back()
            .map(|(_, entry)| entry.clone())
    }

    /// All stored versions of a network, ascending.
    pub fn metadata_versions(&self, genesis_hash: &GenesisHash) -> Vec<u32> {
        self.metadata
            .range((*genesis_hash, 0)..=(*genesis_hash, u32::MAX))
            .map(|((_, version), _)| *version)
            .collect()
    }

    /// Specs of a network.
    pub fn specs(&self, genesis_hash: &GenesisHash) -> Option<&NetworkSpecs> {
        self.specs.get(genesis_hash)
    }

    /// All known networks, ordered by genesis hash.
    pub fn networks(&self) -> Vec<NetworkSpecs> {
        self.specs.values().cloned().collect()
    }

    /// Verifier in effect for a network; `None` when unknown or dead.
    pub fn verifier(&self, genesis_hash: &GenesisHash) -> Option<Verifier> {
        self.verifiers
            .get(genesis_hash)
            .and_then(|pin| pin.resolve(&self.general_verifier))
    }

    /// Raw pin of a network, kept after the network itself is removed.
    pub fn pin(&self, genesis_hash: &GenesisHash) -> Option<&NetworkPin> {
        self.verifiers.get(genesis_hash)
    }

    /// Vault-wide general verifier.
    pub fn general_verifier(&self) -> &Verifier {
        &self.general_verifier
    }

    /// Replace the general verifier. Networks pinned to `General` follow it.
    pub fn set_general_verifier(&mut self, verifier: Verifier) {
        self.general_verifier = verifier;
    }
}

fn push_pin_write(
    writes: &mut Vec<RegistryWrite>,
    genesis_hash: &GenesisHash,
    transition: &PinTransition,
) {
    match transition {
        PinTransition::Establish(pin) | PinTransition::Upgrade(pin) => {
            writes.push(RegistryWrite::Verifier {
                genesis_hash: *genesis_hash,
                pin: pin.clone(),
            })
        }
        PinTransition::Keep => {}
    }
}

fn load(record: MetadataRecord) -> Result<LoadedMetadata, RegistryError> {
    let runtime = RuntimeMetadata::decode(&record.blob)
        .map_err(|e| RegistryError::InvalidMetadata(e.to_string()))?;
    Ok(LoadedMetadata { record, runtime })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::TrustViolation;
    use shared_types::{Encryption, MultiSigner};

    const GENESIS: GenesisHash = [0xe1; 32];

    fn specs() -> NetworkSpecs {
        NetworkSpecs {
            genesis_hash: GENESIS,
            name: "westend".into(),
            title: "Westend".into(),
            unit: "WND".into(),
            decimals: 12,
            base58_prefix: 42,
            encryption: Encryption::Ed25519,
            default_path: "//westend".into(),
        }
    }

    fn blob(version: u32) -> Vec<u8> {
        RuntimeMetadata {
            spec_name: "westend".into(),
            spec_version: version,
            types: Vec::new(),
            pallets: Vec::new(),
        }
        .encode()
    }

    fn signer(byte: u8) -> MultiSigner {
        MultiSigner::new(Encryption::Ed25519, vec![byte; 32]).unwrap()
    }

    fn accept(
        state: &mut RegistryState,
        candidate: &UpdateCandidate,
    ) -> Result<UpdatePlan, RegistryError> {
        let plan = state.plan(candidate)?;
        state.apply(&plan)?;
        Ok(plan)
    }

    fn with_network() -> RegistryState {
        let mut state = RegistryState::default();
        accept(&mut state, &UpdateCandidate::network_specs(specs())).unwrap();
        state
    }

    #[test]
    fn test_metadata_requires_specs() {
        let state = RegistryState::default();
        let candidate = UpdateCandidate::metadata(GENESIS, blob(1)).unwrap();
        assert!(matches!(
            state.plan(&candidate),
            Err(RegistryError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn test_versions_coexist() {
        let mut state = with_network();
        for version in [3, 1, 2] {
            let candidate = UpdateCandidate::metadata(GENESIS, blob(version)).unwrap();
            accept(&mut state, &candidate).unwrap();
        }
        assert_eq!(state.metadata_versions(&GENESIS), vec![1, 2, 3]);
        assert_eq!(state.latest_metadata(&GENESIS).unwrap().record.spec_version, 3);
    }

    #[test]
    fn test_identical_metadata_already_known() {
        let mut state = with_network();
        let candidate = UpdateCandidate::metadata(GENESIS, blob(7)).unwrap();
        accept(&mut state, &candidate).unwrap();
        assert!(matches!(
            state.plan(&candidate),
            Err(RegistryError::AlreadyKnown(_))
        ));
    }

    #[test]
    fn test_metadata_immutable() {
        let mut state = with_network();
        accept(&mut state, &UpdateCandidate::metadata(GENESIS, blob(7)).unwrap()).unwrap();

        let mut altered = RuntimeMetadata::decode(&blob(7)).unwrap();
        altered.types.push(shared_types::PortableType::anonymous(
            shared_types::TypeDef::Primitive(shared_types::Primitive::U8),
        ));
        let candidate = UpdateCandidate::metadata(GENESIS, altered.encode()).unwrap();
        assert_eq!(
            state.plan(&candidate),
            Err(RegistryError::MetadataMismatch {
                name: "westend".into(),
                spec_version: 7
            })
        );
    }

    #[test]
    fn test_name_mismatch() {
        let state = with_network();
        let other = RuntimeMetadata {
            spec_name: "kusama".into(),
            spec_version: 1,
            types: Vec::new(),
            pallets: Vec::new(),
        };
        let candidate = UpdateCandidate::metadata(GENESIS, other.encode()).unwrap();
        assert!(matches!(
            state.plan(&candidate),
            Err(RegistryError::NameMismatch { .. })
        ));
    }

    #[test]
    fn test_pin_upgrade_with_known_content() {
        let mut state = with_network();
        let unsigned = UpdateCandidate::metadata(GENESIS, blob(7)).unwrap();
        accept(&mut state, &unsigned).unwrap();

        let signed = unsigned.with_signature(signer(9), vec![0; 64]);
        let plan = accept(&mut state, &signed).unwrap();
        assert!(plan.warnings.contains(&RegistryWarning::ContentAlreadyKnown));
        assert_eq!(state.verifier(&GENESIS), Some(Verifier::pinned(signer(9))));
    }

    #[test]
    fn test_trust_checked_before_content() {
        let mut state = RegistryState::default();
        let signed_specs =
            UpdateCandidate::network_specs(specs()).with_signature(signer(1), vec![0; 64]);
        accept(&mut state, &signed_specs).unwrap();

        // Identical specs, unsigned: the trust rule wins over AlreadyKnown.
        assert_eq!(
            state.plan(&UpdateCandidate::network_specs(specs())),
            Err(RegistryError::Trust(TrustViolation::VerifierDisappeared {
                pinned: Verifier::pinned(signer(1))
            }))
        );
    }

    #[test]
    fn test_specs_scheme_change_rejected() {
        let state = with_network();
        let mut changed = specs();
        changed.encryption = Encryption::Ecdsa;
        assert!(matches!(
            state.plan(&UpdateCandidate::network_specs(changed)),
            Err(RegistryError::SpecsConflict(_))
        ));
    }

    #[test]
    fn test_specs_display_update_allowed() {
        let mut state = with_network();
        let mut changed = specs();
        changed.title = "Westend Testnet".into();
        accept(&mut state, &UpdateCandidate::network_specs(changed)).unwrap();
        assert_eq!(state.specs(&GENESIS).unwrap().title, "Westend Testnet");
    }

    #[test]
    fn test_snapshot_restores_state() {
        let mut state = with_network();
        accept(&mut state, &UpdateCandidate::metadata(GENESIS, blob(5)).unwrap()).unwrap();

        let snapshot = RegistrySnapshot {
            specs: state.networks(),
            metadata: vec![state.metadata(&GENESIS, 5).unwrap().record.clone()],
            verifiers: vec![(GENESIS, NetworkPin::Custom(Verifier::none()))],
            general_verifier: Verifier::pinned(signer(4)),
        };
        let restored = RegistryState::from_snapshot(snapshot).unwrap();
        assert_eq!(restored.metadata_versions(&GENESIS), vec![5]);
        assert_eq!(restored.verifier(&GENESIS), Some(Verifier::none()));
        assert_eq!(restored.general_verifier(), &Verifier::pinned(signer(4)));
    }

    // =========================================================================
    // Removal
    // =========================================================================

    fn remove_network(state: &mut RegistryState) -> Removal {
        let removal = state.plan_network_removal(&GENESIS).unwrap();
        state.apply_writes(&removal.writes).unwrap();
        removal
    }

    #[test]
    fn test_remove_metadata_keeps_network() {
        let mut state = with_network();
        for version in [1, 2] {
            let candidate = UpdateCandidate::metadata(GENESIS, blob(version)).unwrap();
            accept(&mut state, &candidate).unwrap();
        }

        let removal = state.plan_metadata_removal(&GENESIS, 1).unwrap();
        assert_eq!(removal.spec_versions, vec![1]);
        assert!(!removal.specs_removed);
        state.apply_writes(&removal.writes).unwrap();

        assert_eq!(state.metadata_versions(&GENESIS), vec![2]);
        assert!(state.specs(&GENESIS).is_some());
        assert_eq!(
            state.plan_metadata_removal(&GENESIS, 1),
            Err(RegistryError::NotFound {
                genesis_hash: hex::encode(GENESIS),
                spec_version: 1
            })
        );
        // A removed version may be loaded again.
        accept(&mut state, &UpdateCandidate::metadata(GENESIS, blob(1)).unwrap()).unwrap();
        assert_eq!(state.metadata_versions(&GENESIS), vec![1, 2]);
    }

    #[test]
    fn test_remove_unverified_network_can_be_re_added() {
        let mut state = with_network();
        accept(&mut state, &UpdateCandidate::metadata(GENESIS, blob(3)).unwrap()).unwrap();

        let removal = remove_network(&mut state);
        assert_eq!(removal.spec_versions, vec![3]);
        assert!(!removal.disabled);
        assert!(state.specs(&GENESIS).is_none());
        assert!(state.metadata_versions(&GENESIS).is_empty());
        assert_eq!(state.pin(&GENESIS), Some(&NetworkPin::Custom(Verifier::none())));

        accept(&mut state, &UpdateCandidate::network_specs(specs())).unwrap();
        assert!(state.specs(&GENESIS).is_some());
    }

    #[test]
    fn test_remove_custom_verified_network_disables_it() {
        let mut state = RegistryState::default();
        let signed_specs =
            UpdateCandidate::network_specs(specs()).with_signature(signer(1), vec![0; 64]);
        accept(&mut state, &signed_specs).unwrap();

        let removal = remove_network(&mut state);
        assert!(removal.disabled);
        assert_eq!(state.pin(&GENESIS), Some(&NetworkPin::Dead));
        assert_eq!(state.verifier(&GENESIS), None);

        // Not even the old verifier can bring it back.
        assert_eq!(
            state.plan(&signed_specs),
            Err(RegistryError::Trust(TrustViolation::NetworkDisabled))
        );
        assert_eq!(
            state.plan(&UpdateCandidate::metadata(GENESIS, blob(1)).unwrap()),
            Err(RegistryError::Trust(TrustViolation::NetworkDisabled))
        );
        assert!(matches!(
            state.plan_network_removal(&GENESIS),
            Err(RegistryError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn test_remove_general_verified_network_can_be_re_added() {
        let mut state = RegistryState::default();
        state.set_general_verifier(Verifier::pinned(signer(5)));
        let by_general =
            UpdateCandidate::network_specs(specs()).with_signature(signer(5), vec![0; 64]);
        let plan = accept(&mut state, &by_general).unwrap();
        assert_eq!(plan.pin, PinTransition::Establish(NetworkPin::General));
        assert_eq!(state.verifier(&GENESIS), Some(Verifier::pinned(signer(5))));

        let removal = remove_network(&mut state);
        assert!(!removal.disabled);
        assert_eq!(state.pin(&GENESIS), Some(&NetworkPin::General));

        // Back again under the general verifier; unsigned is still refused.
        assert!(matches!(
            state.plan(&UpdateCandidate::network_specs(specs())),
            Err(RegistryError::Trust(TrustViolation::VerifierDisappeared { .. }))
        ));
        accept(&mut state, &by_general).unwrap();
        assert!(state.specs(&GENESIS).is_some());
    }
}
