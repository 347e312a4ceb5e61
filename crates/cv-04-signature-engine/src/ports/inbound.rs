//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::{KeyHandle, Signature, UnlockContext};
use crate::domain::errors::SignError;
use shared_types::{Encryption, MultiSigner, SignablePayload};

/// Primary Signature Engine API.
pub trait SignatureEngineApi: Send + Sync {
    /// Derive a key from a stored seed and add it to the key ring.
    fn derive(
        &self,
        seed_name: &str,
        path: &str,
        encryption: Encryption,
    ) -> Result<KeyHandle, SignError>;

    /// Sign with a key, re-deriving its secret from `unlock`.
    ///
    /// `unlock` is consumed; its secrets are wiped before this returns.
    fn sign(
        &self,
        key: &KeyHandle,
        payload: &SignablePayload,
        unlock: UnlockContext,
    ) -> Result<Signature, SignError>;

    /// Check a signature by any signer.
    fn verify(
        &self,
        signer: &MultiSigner,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), SignError>;

    /// Derived key able to sign for `signer`.
    fn key_for(&self, signer: &MultiSigner) -> Option<KeyHandle>;

    /// Keys derived so far from a seed.
    fn keys(&self, seed_name: &str) -> Vec<KeyHandle>;

    /// Names of stored seeds.
    fn seed_names(&self) -> Vec<String>;
}
