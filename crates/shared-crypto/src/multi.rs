//! # Scheme Dispatch
//!
//! Signs, verifies and derives public keys for any `Encryption` from raw
//! 32-byte secrets, so callers never branch on the scheme themselves.

use crate::ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey};
use crate::ed25519::{Ed25519KeyPair, Ed25519PublicKey};
use crate::schnorr::{SchnorrKeyPair, SchnorrPublicKey};
use crate::CryptoError;
use shared_types::{Encryption, MultiSigner};
use subtle::ConstantTimeEq;

/// Public key bytes for `secret` under `encryption`.
pub fn public_key_from_secret(
    encryption: Encryption,
    secret: &[u8; 32],
) -> Result<Vec<u8>, CryptoError> {
    let public = match encryption {
        Encryption::Ed25519 => Ed25519KeyPair::from_seed(secret).public_key().as_bytes().to_vec(),
        Encryption::Schnorr => SchnorrKeyPair::from_bytes(secret)?
            .public_key()
            .as_bytes()
            .to_vec(),
        Encryption::Ecdsa => Secp256k1KeyPair::from_bytes(secret)?
            .public_key()
            .as_bytes()
            .to_vec(),
    };
    Ok(public)
}

/// Sign `message` with `secret` under `encryption`.
pub fn sign_with_secret(
    encryption: Encryption,
    secret: &[u8; 32],
    message: &[u8],
) -> Result<[u8; 64], CryptoError> {
    match encryption {
        Encryption::Ed25519 => Ok(Ed25519KeyPair::from_seed(secret).sign(message)),
        Encryption::Schnorr => SchnorrKeyPair::from_bytes(secret)?.sign(message),
        Encryption::Ecdsa => Ok(Secp256k1KeyPair::from_bytes(secret)?.sign(message)),
    }
}

/// Verify `signature` over `message` by `signer`.
pub fn verify_signature(
    signer: &MultiSigner,
    message: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    if signature.len() != signer.encryption.signature_len() {
        return Err(CryptoError::InvalidSignatureFormat);
    }
    let public = &signer.public;
    match signer.encryption {
        Encryption::Ed25519 => Ed25519PublicKey::from_slice(public)?.verify(message, signature),
        Encryption::Schnorr => SchnorrPublicKey::from_slice(public)?.verify(message, signature),
        Encryption::Ecdsa => Secp256k1PublicKey::from_slice(public)?.verify(message, signature),
    }
}

/// Constant-time public key comparison.
pub fn keys_match(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_scheme_signs_and_verifies() {
        let secret = [0x5a; 32];
        for encryption in Encryption::ALL {
            let public = public_key_from_secret(encryption, &secret).unwrap();
            assert_eq!(public.len(), encryption.public_key_len());

            let signer = MultiSigner::new(encryption, public).unwrap();
            let signature = sign_with_secret(encryption, &secret, b"payload").unwrap();
            assert!(verify_signature(&signer, b"payload", &signature).is_ok());
            assert!(verify_signature(&signer, b"tampered", &signature).is_err());
        }
    }

    #[test]
    fn test_wrong_length_signature() {
        let secret = [0x5a; 32];
        let public = public_key_from_secret(Encryption::Ed25519, &secret).unwrap();
        let signer = MultiSigner::new(Encryption::Ed25519, public).unwrap();
        assert_eq!(
            verify_signature(&signer, b"payload", &[0u8; 63]),
            Err(CryptoError::InvalidSignatureFormat)
        );
    }

    #[test]
    fn test_keys_match() {
        assert!(keys_match(&[1, 2, 3], &[1, 2, 3]));
        assert!(!keys_match(&[1, 2, 3], &[1, 2, 4]));
        assert!(!keys_match(&[1, 2], &[1, 2, 3]));
    }
}
