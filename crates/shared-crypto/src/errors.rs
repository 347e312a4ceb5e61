//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid signature format
    #[error("Invalid signature format")]
    InvalidSignatureFormat,

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Secret bytes are not a valid scalar for the curve
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Signing failed inside the backend
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// A scalar tweak produced an invalid key
    #[error("Key tweak out of range")]
    TweakOutOfRange,
}
