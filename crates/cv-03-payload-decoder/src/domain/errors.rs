//! # Domain Errors
//!
//! Two levels of failure:
//!
//! - `DecodeError` rejects the whole payload (bad envelope, unknown network).
//! - `CallError` stays inside one call; the decoder turns it into an error
//!   card at that call's position and continues with sibling calls.

use shared_types::{CodecError, Encryption, TypeId};
use thiserror::Error;

/// Fatal payload errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Envelope bytes are truncated or malformed.
    #[error("Malformed payload: {0}")]
    Codec(#[from] CodecError),

    /// First byte is not the vault payload prefix.
    #[error("Unknown payload prefix {0:#04x}")]
    BadPrefix(u8),

    /// Scheme byte is neither a known scheme nor the unsigned marker.
    #[error("Unknown signature scheme byte {0:#04x}")]
    UnknownScheme(u8),

    /// Content byte is not a known payload kind.
    #[error("Unknown payload content {0:#04x}")]
    UnknownContent(u8),

    /// The unsigned marker was used on a payload that must have an author.
    #[error("Payload kind {0:#04x} requires an author key")]
    MissingAuthor(u8),

    /// No network specs for this genesis hash.
    #[error("Unknown network {0}")]
    UnknownNetwork(String),

    /// The author's scheme differs from the network's.
    #[error("Network {network} uses {expected}, payload is signed with {found}")]
    SchemeMismatch {
        /// Network name.
        network: String,
        /// Network scheme.
        expected: Encryption,
        /// Scheme in the envelope.
        found: Encryption,
    },

    /// No metadata for the declared version and blind signing is disabled.
    #[error("No metadata for {network} version {spec_version}")]
    NoMetadata {
        /// Network name.
        network: String,
        /// Declared spec version.
        spec_version: u32,
    },

    /// Extension genesis hash differs from the trailing one.
    #[error("Genesis hash in extensions does not match the payload's network")]
    GenesisMismatch,

    /// Mortal content byte with an immortal era or the reverse.
    #[error("Era does not match the transaction kind: {0}")]
    EraMismatch(&'static str),

    /// Era bytes encode an impossible period or phase.
    #[error("Invalid era encoding")]
    InvalidEra,

    /// The payload is of a different kind than the operation expects.
    #[error("Expected {expected} payload, found content {found:#04x}")]
    WrongKind {
        /// What the caller asked for.
        expected: &'static str,
        /// Content byte found.
        found: u8,
    },
}

/// Errors confined to one call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// Argument bytes are truncated or malformed.
    #[error("{0}")]
    Codec(#[from] CodecError),

    /// No pallet with this index.
    #[error("Unknown pallet index {0}")]
    UnknownPallet(u8),

    /// Pallet exists but has no calls.
    #[error("Pallet {0} has no calls")]
    NoCalls(String),

    /// No call with this index in the pallet.
    #[error("Unknown call index {index} in pallet {pallet}")]
    UnknownCall {
        /// Pallet name.
        pallet: String,
        /// Call index.
        index: u8,
    },

    /// No variant with this index in an enum type.
    #[error("Unknown variant index {index} of type {ty}")]
    UnknownVariant {
        /// Enum type id.
        ty: TypeId,
        /// Variant index.
        index: u8,
    },

    /// Type id outside the registry.
    #[error("Unknown type id {0}")]
    UnknownType(TypeId),

    /// Pallet call type is not a variant.
    #[error("Type {0} is not a call enum")]
    NotAVariant(TypeId),

    /// Bool byte other than 0 or 1.
    #[error("Invalid bool byte {0:#04x}")]
    InvalidBool(u8),

    /// Sequence length exceeds the remaining bytes.
    #[error("Sequence of {len} elements cannot fit in {remaining} bytes")]
    SequenceTooLong {
        /// Declared length.
        len: usize,
        /// Bytes left in the call.
        remaining: usize,
    },

    /// Type nesting exceeds the configured depth.
    #[error("Nesting deeper than {0} levels")]
    TooDeep(u32),

    /// Call arguments did not consume the whole call.
    #[error("{0} unread bytes after call arguments")]
    TrailingBytes(usize),
}
