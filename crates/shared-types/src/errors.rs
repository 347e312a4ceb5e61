//! # Error Types
//!
//! Errors raised while reading the binary encodings shared across subsystems.

use thiserror::Error;

/// Errors produced by the compact codec and the structures built on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended before the expected number of bytes.
    #[error("Unexpected end of input: needed {needed} bytes at offset {offset}")]
    UnexpectedEof { offset: usize, needed: usize },

    /// A compact integer used a wider mode than its value requires.
    #[error("Non-canonical compact encoding at offset {offset}")]
    NonCanonicalCompact { offset: usize },

    /// A compact integer does not fit the target width.
    #[error("Compact value overflows {target}")]
    CompactOverflow { target: &'static str },

    /// A string field is not valid UTF-8.
    #[error("Invalid UTF-8 at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// An enum tag is outside the known set.
    #[error("Unknown {what} tag {tag:#04x}")]
    UnknownTag { what: &'static str, tag: u8 },

    /// A structural rule of the encoding was violated.
    #[error("Invalid encoding: {0}")]
    Invalid(String),

    /// Bytes were left over after a complete value.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}
