//! # Signature Engine Service
//!
//! Implements `SignatureEngineApi` on top of a `SeedSource`. Derived handles
//! are remembered in a public-only key ring; secrets exist only inside a
//! single `derive` or `sign` call.

use crate::domain::config::SigningConfig;
use crate::domain::derivation::derive_secret;
use crate::domain::entities::{KeyHandle, KeyRing, Signature, UnlockContext};
use crate::domain::errors::{PathError, SignError};
use crate::domain::path::SecretPath;
use crate::ports::inbound::SignatureEngineApi;
use crate::ports::outbound::SeedSource;
use parking_lot::RwLock;
use shared_crypto::{keys_match, public_key_from_secret, sign_with_secret, verify_signature};
use shared_types::{Encryption, MultiSigner, SignablePayload};
use tracing::{debug, info, warn};

/// The Signature Engine Service.
pub struct SignatureEngineService<S: SeedSource> {
    config: SigningConfig,
    seeds: S,
    keyring: RwLock<KeyRing>,
}

impl<S: SeedSource> SignatureEngineService<S> {
    /// Create the service with default limits and an empty key ring.
    pub fn new(seeds: S) -> Self {
        Self::with_config(SigningConfig::default(), seeds)
    }

    /// Create the service with explicit limits.
    pub fn with_config(config: SigningConfig, seeds: S) -> Self {
        Self {
            config,
            seeds,
            keyring: RwLock::new(KeyRing::new()),
        }
    }

    /// Active limits.
    pub fn config(&self) -> &SigningConfig {
        &self.config
    }

    /// Number of derived keys.
    pub fn key_count(&self) -> usize {
        self.keyring.read().len()
    }

    /// Forget every derived key of a seed.
    pub fn forget_seed(&self, seed_name: &str) -> usize {
        let removed = self.keyring.write().remove_seed(seed_name);
        info!(seed = seed_name, removed, "Seed keys forgotten");
        removed
    }
}

impl<S: SeedSource> SignatureEngineApi for SignatureEngineService<S> {
    fn derive(
        &self,
        seed_name: &str,
        path: &str,
        encryption: Encryption,
    ) -> Result<KeyHandle, SignError> {
        let parsed = SecretPath::parse(path)?;
        let depth = parsed.path.junctions.len();
        if depth > self.config.max_path_depth {
            return Err(PathError::TooDeep {
                depth,
                max: self.config.max_path_depth,
            }
            .into());
        }
        let phrase = self
            .seeds
            .seed_phrase(seed_name)
            .map_err(|e| SignError::SeedSource(e.to_string()))?
            .ok_or_else(|| SignError::UnknownSeed(seed_name.to_string()))?;

        let secret = derive_secret(
            encryption,
            &phrase,
            &parsed.path,
            parsed.password.as_deref().map(String::as_str),
        )?;
        let public = public_key_from_secret(encryption, &secret)?;

        let handle = KeyHandle {
            seed_name: seed_name.to_string(),
            path: parsed.path.to_string(),
            has_password: parsed.has_password(),
            encryption,
            public,
        };
        let new = self.keyring.write().insert(handle.clone());
        info!(
            seed = seed_name,
            path = %handle.path,
            has_password = handle.has_password,
            scheme = %encryption,
            public = %handle.public_hex(),
            new,
            "Key derived"
        );
        Ok(handle)
    }

    fn sign(
        &self,
        key: &KeyHandle,
        payload: &SignablePayload,
        unlock: UnlockContext,
    ) -> Result<Signature, SignError> {
        if key.has_password != unlock.password().is_some() {
            warn!(
                public = %key.public_hex(),
                "Sign rejected: password presence does not match key"
            );
            return Err(SignError::WrongSecret);
        }
        let parsed = SecretPath::parse(&key.path)?;
        let secret = derive_secret(
            key.encryption,
            unlock.seed_phrase(),
            &parsed.path,
            unlock.password(),
        )?;
        drop(unlock);

        let public = public_key_from_secret(key.encryption, &secret)?;
        if !keys_match(&public, &key.public) {
            warn!(public = %key.public_hex(), "Sign rejected: secret does not reproduce key");
            return Err(SignError::WrongSecret);
        }

        let bytes = sign_with_secret(key.encryption, &secret, &payload.bytes)?;
        info!(
            public = %key.public_hex(),
            scheme = %key.encryption,
            mode = ?payload.mode,
            genesis_hash = %hex::encode(payload.genesis_hash),
            "Payload signed"
        );
        Ok(Signature::new(key.encryption, bytes))
    }

    fn verify(
        &self,
        signer: &MultiSigner,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), SignError> {
        let result = verify_signature(signer, message, signature).map_err(SignError::from);
        debug!(signer = %signer, valid = result.is_ok(), "Signature verified");
        result
    }

    fn key_for(&self, signer: &MultiSigner) -> Option<KeyHandle> {
        self.keyring.read().get(signer).cloned()
    }

    fn keys(&self, seed_name: &str) -> Vec<KeyHandle> {
        self.keyring.read().for_seed(seed_name)
    }

    fn seed_names(&self) -> Vec<String> {
        self.seeds.seed_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::InMemorySeedSource;
    use shared_types::SigningMode;
    use std::sync::Arc;

    const PHRASE: &str = "bottom drive obey lake curtain smoke basket hold race lonely fit walk";

    fn engine() -> SignatureEngineService<Arc<InMemorySeedSource>> {
        let seeds = Arc::new(InMemorySeedSource::new());
        seeds.add_seed("alice", PHRASE);
        SignatureEngineService::new(seeds)
    }

    fn payload(bytes: &[u8]) -> SignablePayload {
        SignablePayload {
            genesis_hash: [1; 32],
            mode: SigningMode::Plain,
            bytes: bytes.to_vec(),
        }
    }

    // =========================================================================
    // Derivation
    // =========================================================================

    #[test]
    fn test_derive_is_deterministic_for_all_schemes() {
        let engine = engine();
        for encryption in Encryption::ALL {
            let first = engine.derive("alice", "//westend//0", encryption).unwrap();
            let second = engine.derive("alice", "//westend//0", encryption).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.public.len(), encryption.public_key_len());
        }
        assert_eq!(engine.key_count(), 3);
    }

    #[test]
    fn test_handle_hides_password() {
        let engine = engine();
        let handle = engine.derive("alice", "//westend///pw", Encryption::Ed25519).unwrap();
        assert_eq!(handle.path, "//westend");
        assert!(handle.has_password);

        let plain = engine.derive("alice", "//westend", Encryption::Ed25519).unwrap();
        assert_ne!(handle.public, plain.public);
    }

    #[test]
    fn test_derive_errors() {
        let engine = engine();
        assert_eq!(
            engine.derive("bob", "//a", Encryption::Ed25519),
            Err(SignError::UnknownSeed("bob".into()))
        );
        assert_eq!(
            engine.derive("alice", "//a/b", Encryption::Ecdsa),
            Err(SignError::SoftDerivationUnsupported(Encryption::Ecdsa))
        );
        assert!(matches!(
            engine.derive("alice", "a", Encryption::Ed25519),
            Err(SignError::InvalidPath(_))
        ));
        assert_eq!(engine.key_count(), 0);
    }

    #[test]
    fn test_path_depth_limit() {
        let seeds = Arc::new(InMemorySeedSource::new());
        seeds.add_seed("alice", PHRASE);
        let engine =
            SignatureEngineService::with_config(SigningConfig { max_path_depth: 2 }, seeds);

        assert!(engine.derive("alice", "//a//b", Encryption::Ed25519).is_ok());
        assert_eq!(
            engine.derive("alice", "//a//b//c", Encryption::Ed25519),
            Err(SignError::InvalidPath(PathError::TooDeep { depth: 3, max: 2 }))
        );
    }

    #[test]
    fn test_key_ring_resolves_author() {
        let engine = engine();
        let handle = engine.derive("alice", "//kusama", Encryption::Schnorr).unwrap();
        assert_eq!(engine.key_for(&handle.signer()), Some(handle.clone()));
        assert_eq!(engine.keys("alice"), vec![handle]);
        assert_eq!(engine.seed_names(), vec!["alice".to_string()]);
        assert_eq!(engine.forget_seed("alice"), 1);
        assert!(engine.keys("alice").is_empty());
    }

    // =========================================================================
    // Signing
    // =========================================================================

    #[test]
    fn test_sign_and_verify_all_schemes() {
        let engine = engine();
        for (encryption, path) in [
            (Encryption::Ed25519, "//polkadot"),
            (Encryption::Schnorr, "//bitcoin/0/1"),
            (Encryption::Ecdsa, "//ethereum//0"),
        ] {
            let handle = engine.derive("alice", path, encryption).unwrap();
            let message = payload(b"transfer 1 DOT");
            let signature = engine
                .sign(&handle, &message, UnlockContext::new(PHRASE, None))
                .unwrap();

            assert_eq!(signature.encryption, encryption);
            assert!(engine.verify(&handle.signer(), &message.bytes, &signature.bytes).is_ok());
            assert!(engine.verify(&handle.signer(), b"other", &signature.bytes).is_err());
        }
    }

    #[test]
    fn test_sign_with_password() {
        let engine = engine();
        let handle = engine.derive("alice", "//vault///pw", Encryption::Ed25519).unwrap();
        let message = payload(b"msg");

        assert_eq!(
            engine.sign(&handle, &message, UnlockContext::new(PHRASE, None)),
            Err(SignError::WrongSecret)
        );
        assert_eq!(
            engine.sign(&handle, &message, UnlockContext::new(PHRASE, Some("wrong".into()))),
            Err(SignError::WrongSecret)
        );
        assert!(engine
            .sign(&handle, &message, UnlockContext::new(PHRASE, Some("pw".into())))
            .is_ok());
    }

    #[test]
    fn test_sign_with_wrong_phrase() {
        let engine = engine();
        let handle = engine.derive("alice", "//a", Encryption::Ecdsa).unwrap();
        assert_eq!(
            engine.sign(&handle, &payload(b"x"), UnlockContext::new("wrong words", None)),
            Err(SignError::WrongSecret)
        );
    }
}
