//! # Key Derivation
//!
//! ```text
//! root  = derive_key(ROOT[scheme], compact(phrase) · compact(password))
//! hard  = keyed_hash(chain_code, HARD[scheme] · parent_secret)
//! soft  = parent_secret + keyed_hash(chain_code, SOFT · parent_public)   (Schnorr only)
//! ```
//!
//! Every intermediate secret is a `Zeroizing` buffer.

use super::errors::SignError;
use super::path::{DerivationPath, Junction};
use shared_crypto::{
    blake3_derive_key, blake3_keyed_hash_many, public_key_from_secret, tweak_add_secret,
};
use shared_types::{encode_str, Encryption};
use zeroize::Zeroizing;

/// 32-byte secret, wiped on drop.
pub type Secret = Zeroizing<[u8; 32]>;

fn root_context(encryption: Encryption) -> &'static str {
    match encryption {
        Encryption::Ed25519 => "cold-vault 2024-01 ed25519 root secret",
        Encryption::Schnorr => "cold-vault 2024-01 schnorr root secret",
        Encryption::Ecdsa => "cold-vault 2024-01 ecdsa root secret",
    }
}

fn hard_domain(encryption: Encryption) -> &'static [u8] {
    match encryption {
        Encryption::Ed25519 => b"Ed25519HDKD",
        Encryption::Schnorr => b"SchnorrHDKD",
        Encryption::Ecdsa => b"Secp256k1HDKD",
    }
}

const SOFT_DOMAIN: &[u8] = b"SchnorrSoftKD";

/// Root secret for a seed phrase and optional path password.
pub fn root_secret(encryption: Encryption, phrase: &str, password: Option<&str>) -> Secret {
    let mut material = Zeroizing::new(Vec::with_capacity(phrase.len() + 64));
    encode_str(phrase, &mut material);
    encode_str(password.unwrap_or(""), &mut material);
    blake3_derive_key(root_context(encryption), &material)
}

/// One hard step.
pub fn hard_step(encryption: Encryption, parent: &[u8; 32], chain_code: &[u8; 32]) -> Secret {
    blake3_keyed_hash_many(chain_code, &[hard_domain(encryption), parent])
}

/// One soft step. Only Schnorr keys support additive tweaks.
pub fn soft_step(
    encryption: Encryption,
    parent: &[u8; 32],
    chain_code: &[u8; 32],
) -> Result<Secret, SignError> {
    if encryption != Encryption::Schnorr {
        return Err(SignError::SoftDerivationUnsupported(encryption));
    }
    let parent_public = public_key_from_secret(encryption, parent)?;
    let tweak = blake3_keyed_hash_many(chain_code, &[SOFT_DOMAIN, &parent_public]);
    Ok(tweak_add_secret(parent, &tweak)?)
}

/// Secret at `path` below the root secret of `phrase`.
pub fn derive_secret(
    encryption: Encryption,
    phrase: &str,
    path: &DerivationPath,
    password: Option<&str>,
) -> Result<Secret, SignError> {
    if encryption != Encryption::Schnorr && path.has_soft() {
        return Err(SignError::SoftDerivationUnsupported(encryption));
    }
    let mut secret = root_secret(encryption, phrase, password);
    for junction in &path.junctions {
        let chain_code = junction.chain_code();
        secret = match junction {
            Junction::Hard(_) => hard_step(encryption, &secret, &chain_code),
            Junction::Soft(_) => soft_step(encryption, &secret, &chain_code)?,
        };
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::path::SecretPath;
    use proptest::prelude::*;

    const PHRASE: &str = "bottom drive obey lake curtain smoke basket hold race lonely fit walk";

    fn derive(encryption: Encryption, path: &str) -> Result<Secret, SignError> {
        let parsed = SecretPath::parse(path).unwrap();
        derive_secret(
            encryption,
            PHRASE,
            &parsed.path,
            parsed.password.as_deref().map(String::as_str),
        )
    }

    #[test]
    fn test_schemes_have_distinct_roots() {
        let ed = derive(Encryption::Ed25519, "").unwrap();
        let schnorr = derive(Encryption::Schnorr, "").unwrap();
        let ecdsa = derive(Encryption::Ecdsa, "").unwrap();
        assert_ne!(*ed, *schnorr);
        assert_ne!(*schnorr, *ecdsa);
    }

    #[test]
    fn test_junctions_change_the_key() {
        let root = derive(Encryption::Ed25519, "").unwrap();
        let a = derive(Encryption::Ed25519, "//a").unwrap();
        let b = derive(Encryption::Ed25519, "//b").unwrap();
        let ab = derive(Encryption::Ed25519, "//a//b").unwrap();
        assert_ne!(*root, *a);
        assert_ne!(*a, *b);
        assert_ne!(*a, *ab);
    }

    #[test]
    fn test_password_changes_the_key() {
        let plain = derive(Encryption::Ecdsa, "//a").unwrap();
        let with_password = derive(Encryption::Ecdsa, "//a///pw").unwrap();
        assert_ne!(*plain, *with_password);
    }

    #[test]
    fn test_soft_only_for_schnorr() {
        assert_eq!(
            derive(Encryption::Ed25519, "//a/b").unwrap_err(),
            SignError::SoftDerivationUnsupported(Encryption::Ed25519)
        );
        assert_eq!(
            derive(Encryption::Ecdsa, "/b").unwrap_err(),
            SignError::SoftDerivationUnsupported(Encryption::Ecdsa)
        );

        let hard = derive(Encryption::Schnorr, "//a//b").unwrap();
        let soft = derive(Encryption::Schnorr, "//a/b").unwrap();
        assert_ne!(*hard, *soft);
    }

    proptest! {
        #[test]
        fn prop_derivation_is_deterministic(
            junctions in proptest::collection::vec(("[a-z0-9]{1,40}", any::<bool>()), 0..5),
            scheme in 0usize..3,
        ) {
            let encryption = Encryption::ALL[scheme];
            let path: String = junctions
                .iter()
                .map(|(name, hard)| {
                    let hard = *hard || encryption != Encryption::Schnorr;
                    if hard { format!("//{name}") } else { format!("/{name}") }
                })
                .collect();

            let first = derive(encryption, &path).unwrap();
            let second = derive(encryption, &path).unwrap();
            prop_assert_eq!(*first, *second);
            prop_assert!(public_key_from_secret(encryption, &first).is_ok());
        }
    }
}
