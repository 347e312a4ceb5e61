//! # Schnorr Signatures (scheme B, BIP-340)
//!
//! x-only 32-byte public keys over secp256k1. This is the only scheme that
//! supports soft (non-hardened) derivation, implemented as an additive
//! scalar tweak on the secret key.

use crate::CryptoError;
use k256::elliptic_curve::PrimeField;
use k256::ecdsa::signature::{Signer, Verifier};
use k256::schnorr::{Signature, SigningKey, VerifyingKey};
use k256::{NonZeroScalar, Scalar};
use zeroize::{Zeroize, Zeroizing};

/// x-only Schnorr public key (32 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchnorrPublicKey([u8; 32]);

impl SchnorrPublicKey {
    /// Create from a slice, checking it is a valid x-only point.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        VerifyingKey::from_bytes(&array).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(array))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verify a 64-byte BIP-340 signature.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let sig =
            Signature::try_from(signature).map_err(|_| CryptoError::InvalidSignatureFormat)?;

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// BIP-340 keypair.
pub struct SchnorrKeyPair {
    signing_key: SigningKey,
}

impl SchnorrKeyPair {
    /// Create from secret scalar bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Get the x-only public key.
    pub fn public_key(&self) -> SchnorrPublicKey {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&self.signing_key.verifying_key().to_bytes());
        SchnorrPublicKey(bytes)
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Result<[u8; 64], CryptoError> {
        let sig: Signature = self
            .signing_key
            .try_sign(message)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        Ok(sig.to_bytes())
    }
}

impl Drop for SchnorrKeyPair {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

/// Add `tweak` to the secret scalar `secret`, modulo the group order.
///
/// Fails if either input is not a canonical scalar or the sum is zero.
pub fn tweak_add_secret(
    secret: &[u8; 32],
    tweak: &[u8; 32],
) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let parent: Option<Scalar> = Scalar::from_repr((*secret).into()).into();
    let parent = parent.ok_or(CryptoError::InvalidPrivateKey)?;
    let offset: Option<Scalar> = Scalar::from_repr((*tweak).into()).into();
    let offset = offset.ok_or(CryptoError::TweakOutOfRange)?;

    let child: Option<NonZeroScalar> = NonZeroScalar::new(parent + offset).into();
    let child = child.ok_or(CryptoError::TweakOutOfRange)?;

    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(&child.to_repr());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let keypair = SchnorrKeyPair::from_bytes(&[0x11; 32]).unwrap();
        let signature = keypair.sign(b"bip340").unwrap();
        assert!(keypair.public_key().verify(b"bip340", &signature).is_ok());
        assert!(keypair.public_key().verify(b"other", &signature).is_err());
    }

    #[test]
    fn test_public_key_roundtrips_through_slice() {
        let keypair = SchnorrKeyPair::from_bytes(&[0x42; 32]).unwrap();
        let public = keypair.public_key();
        assert_eq!(SchnorrPublicKey::from_slice(public.as_bytes()).unwrap(), public);
    }

    #[test]
    fn test_tweak_changes_key() {
        let secret = [0x42u8; 32];
        let mut tweak = [0u8; 32];
        tweak[31] = 1;
        let child = tweak_add_secret(&secret, &tweak).unwrap();

        let mut expected = secret;
        expected[31] += 1;
        assert_eq!(*child, expected);
    }

    #[test]
    fn test_tweak_rejects_out_of_range() {
        assert_eq!(
            tweak_add_secret(&[0x42; 32], &[0xff; 32]).map(|_| ()),
            Err(CryptoError::TweakOutOfRange)
        );
    }
}
