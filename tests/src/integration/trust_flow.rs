//! # Trust Flow
//!
//! Verifier pins across registry updates, and how the navigator surfaces
//! refused updates.

use super::fixtures::{self, SPEC_VERSION, WESTEND};
use cv_01_metadata_registry::{
    MetadataRegistryApi, NetworkPin, PinTransition, RegistryError, TrustViolation,
};
use cv_05_navigation::{Action, AlertData, NavigationApi, Screen, ScreenData};
use shared_types::{HistoryEvent, UpdateCandidate, Verifier};
use vault_runtime::VaultConfig;

fn metadata_candidate(spec_version: u32) -> UpdateCandidate {
    UpdateCandidate::metadata(WESTEND, fixtures::runtime(spec_version).encode()).unwrap()
}

fn signed_metadata(spec_version: u32, seed: u8) -> UpdateCandidate {
    let (keypair, signer) = fixtures::verifier(seed);
    let candidate = metadata_candidate(spec_version);
    let signature = keypair.sign(&candidate.signed_message);
    candidate.with_signature(signer, signature.to_vec())
}

// =============================================================================
// Registry
// =============================================================================

#[test]
fn test_pin_only_moves_forward() {
    let vault = fixtures::vault();
    let registry = &vault.registry;
    assert_eq!(registry.verifier(&WESTEND), Some(Verifier::none()));

    // Unverified network, signed update: the pin upgrades.
    let (_, v) = fixtures::verifier(1);
    let plan = registry.accept(&signed_metadata(SPEC_VERSION + 1, 1)).unwrap();
    assert_eq!(
        plan.pin,
        PinTransition::Upgrade(NetworkPin::Custom(Verifier::pinned(v.clone())))
    );
    assert_eq!(registry.verifier(&WESTEND), Some(Verifier::pinned(v.clone())));

    // Same verifier again: kept.
    let plan = registry.accept(&signed_metadata(SPEC_VERSION + 2, 1)).unwrap();
    assert_eq!(plan.pin, PinTransition::Keep);

    // Unsigned: the pin cannot disappear.
    assert_eq!(
        registry.accept(&metadata_candidate(SPEC_VERSION + 3)),
        Err(RegistryError::Trust(TrustViolation::VerifierDisappeared {
            pinned: Verifier::pinned(v.clone())
        }))
    );

    // Another key: the pin cannot change.
    let (_, w) = fixtures::verifier(2);
    assert_eq!(
        registry.accept(&signed_metadata(SPEC_VERSION + 3, 2)),
        Err(RegistryError::Trust(TrustViolation::VerifierChanged {
            pinned: Verifier::pinned(v.clone()),
            offered: Verifier::pinned(w),
        }))
    );

    assert_eq!(registry.verifier(&WESTEND), Some(Verifier::pinned(v)));
    assert_eq!(
        registry.metadata_versions(&WESTEND),
        vec![SPEC_VERSION, SPEC_VERSION + 1, SPEC_VERSION + 2]
    );
}

#[test]
fn test_forged_signature_is_refused() {
    let vault = fixtures::vault();
    let (_, signer) = fixtures::verifier(1);
    let forged = metadata_candidate(SPEC_VERSION + 1).with_signature(signer.clone(), vec![0; 64]);
    assert_eq!(
        vault.registry.accept(&forged),
        Err(RegistryError::Trust(TrustViolation::BadSignature { signer }))
    );
    assert_eq!(vault.registry.verifier(&WESTEND), Some(Verifier::none()));
}

#[test]
fn test_metadata_needs_specs_first() {
    let vault = fixtures::empty_vault();
    assert!(matches!(
        vault.registry.accept(&metadata_candidate(SPEC_VERSION)),
        Err(RegistryError::UnknownNetwork(_))
    ));
}

#[test]
fn test_general_verifier_pins_networks_as_group() {
    let general = fixtures::verifier(6);
    let mut config = VaultConfig::default();
    config.registry.general_verifier = Some(general.1.clone());
    let vault = fixtures::vault_with(config);

    let plan = vault
        .registry
        .accept(&signed_metadata(SPEC_VERSION + 1, 6))
        .unwrap();
    assert_eq!(plan.pin, PinTransition::Upgrade(NetworkPin::General));
    assert_eq!(vault.registry.pin(&WESTEND), Some(NetworkPin::General));
    assert_eq!(
        vault.registry.verifier(&WESTEND),
        Some(Verifier::pinned(general.1))
    );

    // Removing a general-verified network leaves it free to come back.
    let removal = vault.registry.remove_network(&WESTEND).unwrap();
    assert!(!removal.disabled);
    vault
        .registry
        .accept(&UpdateCandidate::network_specs(fixtures::specs()))
        .unwrap_err();
    let payload = fixtures::add_specs_payload(&fixtures::specs(), Some(&fixtures::verifier(6)));
    vault
        .navigator
        .perform(Action::AddNetworkSpec, &hex::encode(payload), None)
        .unwrap();
    vault.navigator.perform(Action::ApproveSign, "", None).unwrap();
    assert!(vault.registry.network_specs(&WESTEND).is_some());
}

#[test]
fn test_removed_custom_network_stays_disabled() {
    let vault = fixtures::vault();
    vault.registry.accept(&signed_metadata(SPEC_VERSION + 1, 1)).unwrap();

    let removal = vault.registry.remove_network(&WESTEND).unwrap();
    assert!(removal.disabled);
    assert!(removal.specs_removed);
    assert_eq!(removal.spec_versions, vec![SPEC_VERSION, SPEC_VERSION + 1]);
    assert_eq!(vault.registry.pin(&WESTEND), Some(NetworkPin::Dead));
    assert!(vault.registry.metadata_versions(&WESTEND).is_empty());
    assert!(matches!(
        vault.history.entries().last().map(|entry| &entry.event),
        Some(HistoryEvent::NetworkRemoved { disabled: true, .. })
    ));

    // Not even the old verifier can bring it back.
    let payload = fixtures::add_specs_payload(&fixtures::specs(), Some(&fixtures::verifier(1)));
    assert_eq!(
        vault.registry.accept(&UpdateCandidate::network_specs(fixtures::specs())),
        Err(RegistryError::Trust(TrustViolation::NetworkDisabled))
    );
    let refused = vault
        .navigator
        .perform(Action::AddNetworkSpec, &hex::encode(payload), None)
        .unwrap();
    assert!(matches!(refused.alert_data, Some(AlertData::TrustViolation { .. })));
    assert!(vault.registry.network_specs(&WESTEND).is_none());
}

// =============================================================================
// Navigator
// =============================================================================

#[test]
fn test_unsigned_metadata_for_unverified_network() {
    let vault = fixtures::vault();
    let runtime = fixtures::runtime(SPEC_VERSION + 1);
    let payload = fixtures::load_metadata_payload(&runtime, &WESTEND, None);

    let preview = vault
        .navigator
        .perform(Action::LoadMetadata, &hex::encode(payload), None)
        .unwrap();
    assert!(preview.alert_data.is_none());
    assert!(matches!(
        preview.screen_data,
        ScreenData::Transaction { ref kind, approvable: true, .. } if kind == "update"
    ));

    vault.navigator.perform(Action::ApproveSign, "", None).unwrap();
    assert!(vault.registry.metadata_versions(&WESTEND).contains(&(SPEC_VERSION + 1)));
    assert_eq!(vault.registry.verifier(&WESTEND), Some(Verifier::none()));
}

#[test]
fn test_unsigned_metadata_for_verified_network() {
    let vault = fixtures::vault();
    let verifier = fixtures::verifier(3);
    let runtime = fixtures::runtime(SPEC_VERSION + 1);
    let signed = fixtures::load_metadata_payload(&runtime, &WESTEND, Some(&verifier));
    vault
        .navigator
        .perform(Action::LoadMetadata, &hex::encode(signed), None)
        .unwrap();
    vault.navigator.perform(Action::ApproveSign, "", None).unwrap();
    assert_eq!(
        vault.registry.verifier(&WESTEND),
        Some(Verifier::pinned(verifier.1.clone()))
    );

    let runtime = fixtures::runtime(SPEC_VERSION + 2);
    let unsigned = fixtures::load_metadata_payload(&runtime, &WESTEND, None);
    let refused = vault
        .navigator
        .perform(Action::LoadMetadata, &hex::encode(unsigned), None)
        .unwrap();
    assert!(matches!(refused.alert_data, Some(AlertData::TrustViolation { .. })));

    let home = vault.navigator.perform(Action::GoBack, "", None).unwrap();
    assert_eq!(home.screen_label, "Log");
    assert_eq!(vault.navigator.state().stack(), &[Screen::Log]);
    assert!(!vault.registry.metadata_versions(&WESTEND).contains(&(SPEC_VERSION + 2)));
}

#[test]
fn test_signed_specs_pin_new_network() {
    let vault = fixtures::empty_vault();
    let verifier = fixtures::verifier(4);
    let payload = fixtures::add_specs_payload(&fixtures::specs(), Some(&verifier));

    vault
        .navigator
        .perform(Action::AddNetworkSpec, &hex::encode(payload), None)
        .unwrap();
    assert!(vault.registry.network_specs(&WESTEND).is_none());

    vault.navigator.perform(Action::ApproveSign, "", None).unwrap();
    assert_eq!(vault.registry.verifier(&WESTEND), Some(Verifier::pinned(verifier.1)));
}
