//! # Signable Payloads
//!
//! The exact bytes handed to a signer, produced by the decoder and consumed
//! by the signature engine.

use crate::entities::GenesisHash;
use serde::{Deserialize, Serialize};

/// Whether the signer sees the payload or its digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigningMode {
    /// The payload bytes themselves.
    Plain,
    /// The 32-byte BLAKE3 digest of the payload.
    PreHashed,
}

/// Bytes to sign, already reduced to a digest when `mode` is `PreHashed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignablePayload {
    /// Network the signature is meant for.
    pub genesis_hash: GenesisHash,
    /// How `bytes` were derived from the payload.
    pub mode: SigningMode,
    /// Exact signer input.
    pub bytes: Vec<u8>,
}
