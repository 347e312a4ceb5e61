//! # Test Fixtures
//!
//! A Westend-like network whose runtime knows `Balances.transfer` and
//! `Utility.batch`, plus builders for the payloads a hot device would show.

use cv_03_payload_decoder::{
    build_add_specs, build_load_metadata, build_transaction, Era, Extensions,
};
use shared_crypto::Ed25519KeyPair;
use shared_types::{
    encode_compact, Encryption, Field, GenesisHash, MultiSigner, NetworkSpecs, PalletMeta,
    PortableType, Primitive, RuntimeMetadata, TypeDef, UpdateCandidate, VariantDef,
};
use vault_runtime::{VaultConfig, VaultContext};

/// Seed phrase of the `alice` seed.
pub const PHRASE: &str = "bottom drive obey lake curtain smoke basket hold race lonely fit walk";

/// Genesis hash of the test network.
pub const WESTEND: GenesisHash = [0xe1; 32];

/// Runtime version the fixture metadata describes.
pub const SPEC_VERSION: u32 = 9430;

/// Network specs.
pub fn specs() -> NetworkSpecs {
    NetworkSpecs {
        genesis_hash: WESTEND,
        name: "westend".into(),
        title: "Westend".into(),
        unit: "WND".into(),
        decimals: 12,
        base58_prefix: 42,
        encryption: Encryption::Ed25519,
        default_path: "//westend".into(),
    }
}

/// Runtime with `Balances.transfer` (pallet 4) and `Utility.batch` (pallet 16).
pub fn runtime(spec_version: u32) -> RuntimeMetadata {
    RuntimeMetadata {
        spec_name: "westend".into(),
        spec_version,
        types: vec![
            PortableType::anonymous(TypeDef::Primitive(Primitive::U8)),
            PortableType::anonymous(TypeDef::Array { len: 32, ty: 0 }),
            PortableType::with_path(
                "sp_core::crypto::AccountId32",
                TypeDef::Composite(vec![Field::unnamed(1)]),
            ),
            PortableType::anonymous(TypeDef::Primitive(Primitive::U128)),
            PortableType::anonymous(TypeDef::Compact(3)),
            PortableType::anonymous(TypeDef::Variant(vec![VariantDef {
                name: "transfer".into(),
                index: 0,
                fields: vec![
                    Field::named("dest", 2, None),
                    Field::named("value", 4, Some("BalanceOf<T>")),
                ],
            }])),
            PortableType::anonymous(TypeDef::Call),
            PortableType::anonymous(TypeDef::Sequence(6)),
            PortableType::anonymous(TypeDef::Variant(vec![VariantDef {
                name: "batch".into(),
                index: 0,
                fields: vec![Field::named("calls", 7, None)],
            }])),
        ],
        pallets: vec![
            PalletMeta {
                name: "Balances".into(),
                index: 4,
                calls: Some(5),
            },
            PalletMeta {
                name: "Utility".into(),
                index: 16,
                calls: Some(8),
            },
        ],
    }
}

/// Encoded `Balances.transfer` to a fixed account.
pub fn transfer(amount: u128) -> Vec<u8> {
    let mut call = vec![4, 0];
    call.extend_from_slice(&[0xaa; 32]);
    encode_compact(amount, &mut call);
    call
}

/// Encoded `Utility.batch` of `calls`.
pub fn batch(calls: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![16, 0];
    encode_compact(calls.len() as u128, &mut out);
    for call in calls {
        encode_compact(call.len() as u128, &mut out);
        out.extend_from_slice(call);
    }
    out
}

/// Transaction payload for `call`, authored by `author`.
pub fn transaction(author: &MultiSigner, call: &[u8]) -> Vec<u8> {
    transaction_at(author, call, SPEC_VERSION)
}

/// Transaction payload declaring `spec_version`.
pub fn transaction_at(author: &MultiSigner, call: &[u8], spec_version: u32) -> Vec<u8> {
    let extensions = Extensions {
        era: Era::Mortal {
            phase: 10,
            period: 64,
        },
        nonce: 7,
        tip: 0,
        spec_version,
        tx_version: 26,
        genesis_hash: WESTEND,
        block_hash: [0xb1; 32],
    };
    build_transaction(author, call, &extensions)
}

/// A verifier key pair and its signer.
pub fn verifier(seed: u8) -> (Ed25519KeyPair, MultiSigner) {
    let keypair = Ed25519KeyPair::from_seed(&[seed; 32]);
    let signer = MultiSigner::new(Encryption::Ed25519, keypair.public_key().as_bytes().to_vec())
        .unwrap_or_else(|e| panic!("fixture key: {e}"));
    (keypair, signer)
}

/// `AddSpecs` payload, signed when `signer` is given.
pub fn add_specs_payload(
    specs: &NetworkSpecs,
    signer: Option<&(Ed25519KeyPair, MultiSigner)>,
) -> Vec<u8> {
    match signer {
        Some((keypair, public)) => {
            let signature = keypair.sign(&specs.encode());
            build_add_specs(specs, Some((public, signature.as_slice())))
        }
        None => build_add_specs(specs, None),
    }
}

/// `LoadMetadata` payload, signed when `signer` is given.
pub fn load_metadata_payload(
    runtime: &RuntimeMetadata,
    genesis_hash: &GenesisHash,
    signer: Option<&(Ed25519KeyPair, MultiSigner)>,
) -> Vec<u8> {
    let blob = runtime.encode();
    match signer {
        Some((keypair, public)) => {
            let signature = keypair.sign(&UpdateCandidate::metadata_message(&blob, genesis_hash));
            build_load_metadata(&blob, genesis_hash, Some((public, signature.as_slice())))
        }
        None => build_load_metadata(&blob, genesis_hash, None),
    }
}

/// A vault with nothing loaded.
pub fn empty_vault() -> VaultContext {
    VaultContext::new(VaultConfig::default()).unwrap_or_else(|e| panic!("default config: {e}"))
}

/// A vault that knows the test network (unverified), its metadata and the
/// `alice` seed.
pub fn vault() -> VaultContext {
    vault_with(VaultConfig::default())
}

/// Same as [`vault`] with a custom configuration.
pub fn vault_with(config: VaultConfig) -> VaultContext {
    use cv_01_metadata_registry::MetadataRegistryApi;

    let context = VaultContext::new(config).unwrap_or_else(|e| panic!("fixture config: {e}"));
    context
        .registry
        .accept(&UpdateCandidate::network_specs(specs()))
        .unwrap_or_else(|e| panic!("fixture specs: {e}"));
    let candidate = UpdateCandidate::metadata(WESTEND, runtime(SPEC_VERSION).encode())
        .unwrap_or_else(|e| panic!("fixture metadata: {e}"));
    context
        .registry
        .accept(&candidate)
        .unwrap_or_else(|e| panic!("fixture metadata: {e}"));
    context.seeds.add_seed("alice", PHRASE);
    context
}
