//! # ECDSA Signatures (scheme C, secp256k1)
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalized signatures
//! - Compressed 33-byte public keys

use crate::CryptoError;
use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use zeroize::Zeroize;

/// Compressed secp256k1 public key (33 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Secp256k1PublicKey([u8; 33]);

impl Secp256k1PublicKey {
    /// Create from compressed bytes (33 bytes, starting with 0x02 or 0x03).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; 33] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 33,
            actual: bytes.len(),
        })?;
        VerifyingKey::from_sec1_bytes(&array).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(array))
    }

    /// Get raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Verify an `r || s` signature.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let sig =
            Signature::from_slice(signature).map_err(|_| CryptoError::InvalidSignatureFormat)?;

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// secp256k1 ECDSA keypair.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes(bytes.into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Get public key (compressed, 33 bytes).
    pub fn public_key(&self) -> Secp256k1PublicKey {
        let sec1_bytes = self.signing_key.verifying_key().to_sec1_bytes();
        // SEC1 compressed form is always 33 bytes
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(&sec1_bytes[..33]);
        Secp256k1PublicKey(bytes)
    }

    /// Sign a message (deterministic RFC 6979, SHA-256 prehash).
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        let sig: Signature = self.signing_key.sign(message);
        let sig = sig.normalize_s().unwrap_or(sig);
        sig.to_bytes().into()
    }
}

impl Drop for Secp256k1KeyPair {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let keypair = Secp256k1KeyPair::from_bytes(&[0x11; 32]).unwrap();
        let signature = keypair.sign(b"Hello, secp256k1!");
        assert!(keypair
            .public_key()
            .verify(b"Hello, secp256k1!", &signature)
            .is_ok());
    }

    #[test]
    fn test_wrong_message_fails() {
        let keypair = Secp256k1KeyPair::from_bytes(&[0x22; 32]).unwrap();
        let signature = keypair.sign(b"message1");
        assert!(keypair.public_key().verify(b"message2", &signature).is_err());
    }

    #[test]
    fn test_compressed_key_prefix() {
        let keypair = Secp256k1KeyPair::from_bytes(&[0x33; 32]).unwrap();
        let public = keypair.public_key();
        assert!(matches!(public.as_bytes()[0], 0x02 | 0x03));
        assert_eq!(Secp256k1PublicKey::from_slice(public.as_bytes()).unwrap(), public);
    }

    #[test]
    fn test_zero_secret_rejected() {
        assert!(matches!(
            Secp256k1KeyPair::from_bytes(&[0u8; 32]),
            Err(CryptoError::InvalidPrivateKey)
        ));
    }

    #[test]
    fn test_deterministic_signatures() {
        let keypair = Secp256k1KeyPair::from_bytes(&[0xAB; 32]).unwrap();
        assert_eq!(keypair.sign(b"same"), keypair.sign(b"same"));
    }
}
