//! # Decode Flow
//!
//! Card trees produced from registry metadata, as the navigator shows them.

use super::fixtures::{self, SPEC_VERSION, WESTEND};
use cv_01_metadata_registry::MetadataRegistryApi;
use cv_03_payload_decoder::{CardContent, DecodeError, PayloadDecoderApi, Trust};
use cv_04_signature_engine::SignatureEngineApi;
use cv_05_navigation::{Action, NavigationApi, ScreenData};
use shared_types::{Encryption, SigningMode, UpdateCandidate};
use proptest::prelude::*;
use vault_runtime::VaultConfig;

#[test]
fn test_batch_with_unknown_call() {
    let vault = fixtures::vault();
    let key = vault.signer.derive("alice", "//westend", Encryption::Ed25519).unwrap();
    let call = fixtures::batch(&[fixtures::transfer(5), vec![77, 1, 2, 3]]);
    let payload = fixtures::transaction(&key.signer(), &call);

    let decoded = vault.decoder.decode(&payload).unwrap();
    let calls = &decoded.call.children[0];
    assert_eq!(calls.children.len(), 2);
    assert!(matches!(calls.children[0].content, CardContent::Call { .. }));
    assert_eq!(calls.children[1].trust, Trust::Warning);
    assert!(!decoded.is_signable());

    // The review opens but offers no approval.
    let review = vault
        .navigator
        .perform(Action::TransactionFetched, &hex::encode(&payload), None)
        .unwrap();
    assert!(matches!(
        review.screen_data,
        ScreenData::Transaction { approvable: false, ref author, .. }
            if author.as_ref() == Some(&key)
    ));
}

#[test]
fn test_trust_follows_the_pin() {
    let vault = fixtures::vault();
    let (_, author) = fixtures::verifier(9);
    let next = SPEC_VERSION + 1;

    let unverified = vault
        .decoder
        .decode(&fixtures::transaction(&author, &fixtures::transfer(1)))
        .unwrap();
    assert!(unverified.call.flatten().iter().all(|c| c.trust == Trust::Unverified));

    let (keypair, signer) = fixtures::verifier(1);
    let candidate = UpdateCandidate::metadata(WESTEND, fixtures::runtime(next).encode()).unwrap();
    let signature = keypair.sign(&candidate.signed_message);
    vault
        .registry
        .accept(&candidate.with_signature(signer, signature.to_vec()))
        .unwrap();

    let verified = vault
        .decoder
        .decode(&fixtures::transaction_at(&author, &fixtures::transfer(1), next))
        .unwrap();
    assert!(verified.warnings.is_empty());
    assert!(verified.call.flatten().iter().all(|c| c.trust == Trust::Verified));

    // Signing for the older version still works, with a warning.
    let older = vault
        .decoder
        .decode(&fixtures::transaction(&author, &fixtures::transfer(1)))
        .unwrap();
    assert_eq!(older.warnings.len(), 1);
    assert!(older.is_signable());
}

#[test]
fn test_unknown_version_depends_on_blind_signing() {
    let (_, author) = fixtures::verifier(9);
    let payload = fixtures::transaction_at(&author, &fixtures::transfer(1), 1);

    let strict = fixtures::vault();
    assert_eq!(
        strict.decoder.decode(&payload),
        Err(DecodeError::NoMetadata {
            network: "westend".into(),
            spec_version: 1
        })
    );

    let mut config = VaultConfig::default();
    config.decoder.allow_blind_signing = true;
    let blind = fixtures::vault_with(config);
    let decoded = blind.decoder.decode(&payload).unwrap();
    assert!(decoded.blind);
    assert!(decoded.is_signable());
    assert_eq!(decoded.signing_mode(), SigningMode::PreHashed);
}

#[test]
fn test_undecodable_scan_raises_alert() {
    let vault = fixtures::vault();
    let result = vault
        .navigator
        .perform(Action::TransactionFetched, "53", None)
        .unwrap();
    assert!(result.alert_data.is_some());
    assert!(vault.navigator.state().transaction().is_none());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_batched_transfers_stay_signable(
        amounts in proptest::collection::vec(any::<u128>(), 1..6),
    ) {
        let vault = fixtures::vault();
        let (_, author) = fixtures::verifier(9);
        let calls: Vec<Vec<u8>> =
            amounts.iter().map(|&amount| fixtures::transfer(amount)).collect();
        let payload = fixtures::transaction(&author, &fixtures::batch(&calls));

        let decoded = vault.decoder.decode(&payload).unwrap();
        prop_assert!(decoded.is_signable());
        prop_assert_eq!(decoded.call.children[0].children.len(), amounts.len());
        let again = vault.decoder.decode(&payload).unwrap();
        prop_assert_eq!(decoded.signable.bytes, again.signable.bytes);
    }
}
