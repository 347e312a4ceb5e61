//! # Decoder Configuration

use serde::{Deserialize, Serialize};

/// Signable payloads longer than this are signed as their BLAKE3 digest.
pub const PREHASH_THRESHOLD: usize = 256;

/// Decoder limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Calls longer than this are shown blind (default: 64 KiB).
    pub max_decodable_call_len: usize,

    /// Allow signing calls that could not be decoded (default: false).
    ///
    /// When set, a payload whose metadata version is unknown is shown blind
    /// instead of being rejected.
    pub allow_blind_signing: bool,

    /// Deepest type nesting the decoder follows (default: 32).
    pub max_type_depth: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_decodable_call_len: 64 * 1024,
            allow_blind_signing: false,
            max_type_depth: 32,
        }
    }
}
