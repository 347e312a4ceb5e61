//! # Signing Errors

use shared_crypto::CryptoError;
use shared_types::Encryption;
use thiserror::Error;

/// Derivation path syntax errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    /// A junction between separators is empty (`//` followed by `/`, or a trailing `/`).
    #[error("Empty junction at offset {0}")]
    EmptyJunction(usize),

    /// The path does not start with a separator.
    #[error("Derivation path must start with '/', got {0:?}")]
    MissingSeparator(String),

    /// `///` with nothing after it.
    #[error("Empty password after '///'")]
    EmptyPassword,

    /// More junctions than the configured limit.
    #[error("Derivation path has {depth} junctions, limit is {max}")]
    TooDeep {
        /// Junctions in the path.
        depth: usize,
        /// Configured limit.
        max: usize,
    },
}

/// Errors from derivation and signing.
///
/// None of these carry secret material.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignError {
    /// Path could not be parsed.
    #[error("Invalid derivation path: {0}")]
    InvalidPath(#[from] PathError),

    /// Soft junction used with a scheme that only supports hard derivation.
    #[error("Soft derivation is not supported for {0}")]
    SoftDerivationUnsupported(Encryption),

    /// Seed source has no seed with this name.
    #[error("Unknown seed: {0}")]
    UnknownSeed(String),

    /// Seed phrase or path password does not reproduce the key.
    #[error("Secret does not match the selected key")]
    WrongSecret,

    /// Seed source failed.
    #[error("Seed source error: {0}")]
    SeedSource(String),

    /// Backend failure.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}
