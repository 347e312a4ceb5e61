//! # Scan Flow
//!
//! Frames in, reassembled payload on the bus, review on the navigator,
//! signature frames out.

use super::fixtures::{self, PHRASE};
use cv_02_qr_transport::{
    encode, Insertion, QrFrame, QrTransportApi, ReassemblyBuffer, SubmitOutcome,
};
use cv_03_payload_decoder::PayloadDecoderApi;
use cv_04_signature_engine::SignatureEngineApi;
use cv_05_navigation::{Action, ModalData, NavigationApi};
use proptest::prelude::*;
use shared_bus::VaultEvent;
use shared_types::Encryption;
use std::sync::Arc;
use std::time::Duration;
use vault_runtime::VaultRuntime;

/// Reassemble hex-encoded outbound frames.
fn reassemble(frames: &[String]) -> Vec<u8> {
    let mut frames = frames
        .iter()
        .map(|raw| QrFrame::from_bytes(&hex::decode(raw).unwrap()).unwrap());
    let (mut buffer, mut insertion) =
        ReassemblyBuffer::start(frames.next().unwrap(), 1 << 20).unwrap();
    for frame in frames {
        insertion = buffer.insert(frame).unwrap();
    }
    match insertion {
        Insertion::Complete(payload) => payload,
        other => panic!("frames did not complete the payload: {other:?}"),
    }
}

async fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..300 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

// =============================================================================
// Transport over the shared context
// =============================================================================

#[tokio::test]
async fn test_out_of_order_frames_publish_once() {
    let vault = fixtures::empty_vault();
    let mut events = vault.take_events().unwrap();
    let frames: Vec<Vec<u8>> = encode(b"AABBCC", 2)
        .unwrap()
        .iter()
        .map(QrFrame::to_bytes)
        .collect();
    assert_eq!(frames.len(), 3);

    let session = vault.transport.start_session();
    let mut outcomes = Vec::new();
    for index in [2, 0, 1, 1] {
        outcomes.push(vault.transport.submit(session, &frames[index]).await.unwrap());
    }
    assert_eq!(
        outcomes,
        vec![
            SubmitOutcome::Stored { received: 1, count: 3 },
            SubmitOutcome::Stored { received: 2, count: 3 },
            SubmitOutcome::Complete { payload_len: 6 },
            SubmitOutcome::AlreadyComplete,
        ]
    );

    match events.try_recv().unwrap() {
        Some(VaultEvent::PayloadReassembled { session_id, payload }) => {
            assert_eq!(session_id, session);
            assert_eq!(payload, b"AABBCC");
        }
        other => panic!("expected reassembled payload, got {other:?}"),
    }
    assert!(events.try_recv().unwrap().is_none());
}

/// A payload, a fragment size, and an arrival order of its frames.
fn shuffled_frames() -> impl Strategy<Value = (Vec<u8>, usize, Vec<usize>)> {
    (proptest::collection::vec(any::<u8>(), 1..600), 8usize..64).prop_flat_map(
        |(payload, capacity)| {
            let count = payload.len().div_ceil(capacity);
            let order = Just((0..count).collect::<Vec<_>>()).prop_shuffle();
            (Just(payload), Just(capacity), order)
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_any_arrival_order_publishes_once(
        (payload, capacity, order) in shuffled_frames(),
        repeated in 0usize..4,
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let vault = fixtures::empty_vault();
        let mut events = vault.take_events().unwrap();
        let frames = encode(&payload, capacity).unwrap();
        prop_assert_eq!(frames.len(), order.len());

        let session = vault.transport.start_session();
        rt.block_on(async {
            for &index in order.iter().chain(order.iter().take(repeated)) {
                vault.transport.submit(session, &frames[index].to_bytes()).await.unwrap();
            }
        });

        prop_assert_eq!(
            events.try_recv().unwrap(),
            Some(VaultEvent::PayloadReassembled { session_id: session, payload })
        );
        prop_assert_eq!(events.try_recv().unwrap(), None);
    }
}

#[tokio::test]
async fn test_second_vault_has_its_own_sessions() {
    let first = fixtures::empty_vault();
    let second = fixtures::empty_vault();
    let frames = encode(b"AABBCC", 2).unwrap();

    let session = first.transport.start_session();
    first.transport.submit(session, &frames[0].to_bytes()).await.unwrap();
    assert!(second.transport.session_state(session).is_none());
}

// =============================================================================
// Runtime end to end
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_scanned_transaction_is_signed() {
    let runtime = VaultRuntime::start(fixtures::vault()).unwrap();
    let context = runtime.context();
    let key = context
        .signer
        .derive("alice", "//westend", Encryption::Ed25519)
        .unwrap();

    let payload = fixtures::transaction(&key.signer(), &fixtures::transfer(2_000_000_000_000));
    let sender = runtime.frame_sender();
    for frame in encode(&payload, 48).unwrap().iter().rev() {
        sender.send(frame.to_bytes()).await.unwrap();
    }

    let navigator = Arc::clone(&context.navigator);
    assert!(wait_for(|| navigator.state().transaction().is_some()).await);

    let handle = runtime.navigator();
    let signed = handle
        .perform(Action::ApproveSign, "", Some(PHRASE.to_string()))
        .await
        .unwrap();
    let Some(ModalData::SignatureReady { signature, frames }) = signed.modal_data else {
        panic!("expected signature modal");
    };

    let tagged = reassemble(&frames);
    assert_eq!(hex::encode(&tagged), signature);
    assert_eq!(tagged[0], Encryption::Ed25519.wire_byte());

    let signable = context.decoder.decode(&payload).unwrap().signable;
    context
        .signer
        .verify(&key.signer(), &signable.bytes, &tagged[1..])
        .unwrap();

    drop(handle);
    drop(sender);
    runtime.shutdown().await;
}
