//! # Signing Flow
//!
//! Key derivation across vaults and the lifetime of user secrets.

use super::fixtures::{self, PHRASE};
use cv_03_payload_decoder::PayloadDecoderApi;
use cv_04_signature_engine::SignatureEngineApi;
use cv_05_navigation::{
    Action, AlertData, ModalData, NavigationApi, NavigationError, SecurityContext,
};
use shared_types::Encryption;

#[test]
fn test_derivation_is_deterministic_across_vaults() {
    let first = fixtures::vault();
    let second = fixtures::vault();
    for encryption in [Encryption::Ed25519, Encryption::Ecdsa, Encryption::Schnorr] {
        let a = first.signer.derive("alice", "//westend//0", encryption).unwrap();
        let b = second.signer.derive("alice", "//westend//0", encryption).unwrap();
        assert_eq!(a.public, b.public, "{encryption}");
        assert_eq!(a.public.len(), encryption.public_key_len());

        let other = first.signer.derive("alice", "//westend//1", encryption).unwrap();
        assert_ne!(a.public, other.public, "{encryption}");
    }

    let soft_a = first.signer.derive("alice", "//westend/0", Encryption::Schnorr).unwrap();
    let soft_b = second.signer.derive("alice", "//westend/0", Encryption::Schnorr).unwrap();
    assert_eq!(soft_a.public, soft_b.public);
    assert!(first.signer.derive("alice", "//westend/0", Encryption::Ed25519).is_err());
}

#[test]
fn test_secret_unreachable_after_cancel() {
    let vault = fixtures::vault();
    let key = vault.signer.derive("alice", "//westend", Encryption::Ed25519).unwrap();
    let payload = fixtures::transaction(&key.signer(), &fixtures::transfer(3));
    vault
        .navigator
        .perform(Action::TransactionFetched, &hex::encode(&payload), None)
        .unwrap();

    let failed = vault
        .navigator
        .perform(Action::ApproveSign, "", Some("wrong words"))
        .unwrap();
    assert!(matches!(
        failed.alert_data,
        Some(AlertData::SignFailed { attempts_left: 2, .. })
    ));

    vault.navigator.perform(Action::Cancel, "", None).unwrap();
    let state = vault.navigator.state();
    assert!(state.transaction().is_none());
    assert_eq!(state.security, SecurityContext::Idle);

    let serialized = serde_json::to_string(&state).unwrap();
    assert!(!serialized.contains("wrong words"));
    assert!(!serialized.contains(PHRASE));

    assert_eq!(
        vault.navigator.perform(Action::ApproveSign, "", Some(PHRASE)),
        Err(NavigationError::NothingToApprove)
    );
}

#[test]
fn test_password_path_needs_password_to_sign() {
    let vault = fixtures::vault();
    let key = vault
        .signer
        .derive("alice", "//westend///hunter2", Encryption::Ed25519)
        .unwrap();
    assert!(key.has_password);
    assert!(!key.path.contains("hunter2"));

    let payload = fixtures::transaction(&key.signer(), &fixtures::transfer(4));
    vault
        .navigator
        .perform(Action::TransactionFetched, &hex::encode(&payload), None)
        .unwrap();

    let failed = vault
        .navigator
        .perform(Action::ApproveSign, "", Some(PHRASE))
        .unwrap();
    assert!(matches!(failed.alert_data, Some(AlertData::SignFailed { .. })));
    vault.navigator.perform(Action::GoBack, "", None).unwrap();

    let signed = vault
        .navigator
        .perform(Action::ApproveSign, "hunter2", Some(PHRASE))
        .unwrap();
    let Some(ModalData::SignatureReady { signature, .. }) = signed.modal_data else {
        panic!("expected signature modal");
    };
    let tagged = hex::decode(signature).unwrap();
    let signable = vault.decoder.decode(&payload).unwrap().signable;
    vault
        .signer
        .verify(&key.signer(), &signable.bytes, &tagged[1..])
        .unwrap();

    let serialized = serde_json::to_string(&vault.navigator.state()).unwrap();
    assert!(!serialized.contains("hunter2"));
}
