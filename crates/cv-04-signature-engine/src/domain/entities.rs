//! # Signing Entities

use serde::{Deserialize, Serialize};
use shared_types::{Encryption, MultiSigner, SignatureBytes};
use std::collections::BTreeMap;
use std::fmt;
use zeroize::Zeroizing;

/// A derived key, public data only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyHandle {
    /// Seed the key was derived from.
    pub seed_name: String,
    /// Display form of the derivation path, without the password.
    pub path: String,
    /// Whether a `///password` was part of the path.
    pub has_password: bool,
    /// Signature scheme.
    pub encryption: Encryption,
    /// Public key bytes.
    pub public: Vec<u8>,
}

impl KeyHandle {
    /// The key as a tagged signer.
    pub fn signer(&self) -> MultiSigner {
        MultiSigner {
            encryption: self.encryption,
            public: self.public.clone(),
        }
    }

    /// Hex form of the public key.
    pub fn public_hex(&self) -> String {
        hex::encode(&self.public)
    }
}

/// Secrets supplied by the user for one signing call.
///
/// Consumed by `sign`; both fields are wiped when it returns.
pub struct UnlockContext {
    seed_phrase: Zeroizing<String>,
    password: Option<Zeroizing<String>>,
}

impl UnlockContext {
    /// Unlock with a seed phrase and the path password, if the key has one.
    pub fn new(seed_phrase: impl Into<String>, password: Option<String>) -> Self {
        Self {
            seed_phrase: Zeroizing::new(seed_phrase.into()),
            password: password.map(Zeroizing::new),
        }
    }

    /// Unlock from secrets already held in wiping buffers.
    pub fn from_secrets(
        seed_phrase: Zeroizing<String>,
        password: Option<Zeroizing<String>>,
    ) -> Self {
        Self {
            seed_phrase,
            password,
        }
    }

    /// Seed phrase.
    pub fn seed_phrase(&self) -> &str {
        &self.seed_phrase
    }

    /// Path password.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().map(String::as_str)
    }
}

impl fmt::Debug for UnlockContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UnlockContext(<redacted>)")
    }
}

/// A produced signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Scheme that produced it.
    pub encryption: Encryption,
    /// Raw 64 signature bytes.
    pub bytes: Vec<u8>,
}

impl Signature {
    /// Build from raw bytes.
    pub fn new(encryption: Encryption, bytes: SignatureBytes) -> Self {
        Self {
            encryption,
            bytes: bytes.to_vec(),
        }
    }

    /// Scheme-tagged encoding shown to the online device: `[scheme byte] · signature`.
    pub fn to_tagged_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.bytes.len());
        out.push(self.encryption.wire_byte());
        out.extend_from_slice(&self.bytes);
        out
    }

    /// Hex form of the tagged encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_tagged_bytes())
    }
}

/// Public-only registry of derived keys, indexed by signer.
#[derive(Debug, Clone, Default)]
pub struct KeyRing {
    keys: BTreeMap<MultiSigner, KeyHandle>,
}

impl KeyRing {
    /// Empty ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a key. Returns `true` if the key was new.
    pub fn insert(&mut self, handle: KeyHandle) -> bool {
        self.keys.insert(handle.signer(), handle).is_none()
    }

    /// Key able to sign for `signer`.
    pub fn get(&self, signer: &MultiSigner) -> Option<&KeyHandle> {
        self.keys.get(signer)
    }

    /// Keys derived from one seed, in signer order.
    pub fn for_seed(&self, seed_name: &str) -> Vec<KeyHandle> {
        self.keys
            .values()
            .filter(|handle| handle.seed_name == seed_name)
            .cloned()
            .collect()
    }

    /// Forget every key of a seed. Returns how many were removed.
    pub fn remove_seed(&mut self, seed_name: &str) -> usize {
        let before = self.keys.len();
        self.keys.retain(|_, handle| handle.seed_name != seed_name);
        before - self.keys.len()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the ring is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(seed: &str, byte: u8) -> KeyHandle {
        KeyHandle {
            seed_name: seed.into(),
            path: "//a".into(),
            has_password: false,
            encryption: Encryption::Ed25519,
            public: vec![byte; 32],
        }
    }

    #[test]
    fn test_keyring_lookup_and_removal() {
        let mut ring = KeyRing::new();
        assert!(ring.insert(handle("alice", 1)));
        assert!(ring.insert(handle("alice", 2)));
        assert!(ring.insert(handle("bob", 3)));
        assert!(!ring.insert(handle("bob", 3)));

        assert_eq!(ring.get(&handle("bob", 3).signer()).unwrap().seed_name, "bob");
        assert_eq!(ring.for_seed("alice").len(), 2);
        assert_eq!(ring.remove_seed("alice"), 2);
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_tagged_signature() {
        let signature = Signature::new(Encryption::Ecdsa, [7; 64]);
        let tagged = signature.to_tagged_bytes();
        assert_eq!(tagged.len(), 65);
        assert_eq!(tagged[0], 0x02);
    }

    #[test]
    fn test_unlock_context_debug_is_redacted() {
        let unlock = UnlockContext::new("secret words", Some("pw".into()));
        assert_eq!(format!("{unlock:?}"), "UnlockContext(<redacted>)");
        assert_eq!(unlock.password(), Some("pw"));
    }

    #[test]
    fn test_unlock_context_from_wiping_buffers() {
        let unlock = UnlockContext::from_secrets(
            Zeroizing::new("secret words".into()),
            Some(Zeroizing::new("pw".into())),
        );
        assert_eq!(unlock.seed_phrase(), "secret words");
        assert_eq!(unlock.password(), Some("pw"));

        let bare = UnlockContext::from_secrets(Zeroizing::new("secret words".into()), None);
        assert_eq!(bare.password(), None);
    }
}
