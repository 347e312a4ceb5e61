//! # Payload Envelope
//!
//! ```text
//! [0x53][scheme][content] body...
//! ```
//!
//! | content | body |
//! |---------|------|
//! | `0x00` / `0x02` | author key, `compact(len)` call, extensions, genesis hash |
//! | `0x03` | author key, `compact(len)` message, genesis hash |
//! | `0x80` | [verifier key], `compact(len)` metadata blob, genesis hash, [signature] |
//! | `0xc1` | [verifier key], `compact(len)` specs, [signature] |
//!
//! Scheme `0xff` marks an unsigned update; key and signature are then absent.
//! The builders below produce the same layout, for the companion tooling and
//! for tests.

use super::era::Era;
use super::errors::DecodeError;
use serde::{Deserialize, Serialize};
use shared_types::{
    encode_compact, ByteReader, Encryption, GenesisHash, Hash, MultiSigner, NetworkSpecs,
};

/// First byte of every vault payload.
pub const PAYLOAD_PREFIX: u8 = 0x53;

/// Scheme byte of an unsigned update.
pub const UNSIGNED_MARKER: u8 = 0xff;

/// Payload kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
    /// Transaction with a mortal era.
    MortalTransaction,
    /// Transaction with an immortal era.
    ImmortalTransaction,
    /// Text message.
    Message,
    /// Metadata update.
    LoadMetadata,
    /// Network specs update.
    AddSpecs,
}

impl ContentKind {
    /// Wire byte.
    pub fn byte(self) -> u8 {
        match self {
            ContentKind::MortalTransaction => 0x00,
            ContentKind::ImmortalTransaction => 0x02,
            ContentKind::Message => 0x03,
            ContentKind::LoadMetadata => 0x80,
            ContentKind::AddSpecs => 0xc1,
        }
    }

    /// Parse a wire byte.
    pub fn from_byte(byte: u8) -> Result<Self, DecodeError> {
        match byte {
            0x00 => Ok(ContentKind::MortalTransaction),
            0x02 => Ok(ContentKind::ImmortalTransaction),
            0x03 => Ok(ContentKind::Message),
            0x80 => Ok(ContentKind::LoadMetadata),
            0xc1 => Ok(ContentKind::AddSpecs),
            other => Err(DecodeError::UnknownContent(other)),
        }
    }

    /// Whether this is a transaction of either era kind.
    pub fn is_transaction(self) -> bool {
        matches!(
            self,
            ContentKind::MortalTransaction | ContentKind::ImmortalTransaction
        )
    }

    /// Whether this is a registry update.
    pub fn is_update(self) -> bool {
        matches!(self, ContentKind::LoadMetadata | ContentKind::AddSpecs)
    }
}

/// The three header bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Signature scheme; `None` for unsigned updates.
    pub scheme: Option<Encryption>,
    /// Payload kind.
    pub content: ContentKind,
}

impl Header {
    /// Read and check the header.
    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let prefix = reader.read_u8()?;
        if prefix != PAYLOAD_PREFIX {
            return Err(DecodeError::BadPrefix(prefix));
        }
        let scheme_byte = reader.read_u8()?;
        let scheme = match scheme_byte {
            UNSIGNED_MARKER => None,
            byte => Some(Encryption::from_wire_byte(byte).ok_or(DecodeError::UnknownScheme(byte))?),
        };
        let content = ContentKind::from_byte(reader.read_u8()?)?;
        if scheme.is_none() && !content.is_update() {
            return Err(DecodeError::MissingAuthor(content.byte()));
        }
        Ok(Self { scheme, content })
    }

    /// Peek at the header of a payload without decoding the body.
    pub fn peek(payload: &[u8]) -> Result<Self, DecodeError> {
        Self::read(&mut ByteReader::new(payload))
    }

    fn write(scheme: Option<Encryption>, content: ContentKind, out: &mut Vec<u8>) {
        out.push(PAYLOAD_PREFIX);
        out.push(scheme.map_or(UNSIGNED_MARKER, Encryption::wire_byte));
        out.push(content.byte());
    }
}

/// Read a public key of the scheme's length.
pub fn read_signer(
    reader: &mut ByteReader<'_>,
    scheme: Encryption,
) -> Result<MultiSigner, DecodeError> {
    let key = reader.read_bytes(scheme.public_key_len())?;
    Ok(MultiSigner::new(scheme, key.to_vec())?)
}

/// Signed transaction extensions, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extensions {
    /// Validity window.
    pub era: Era,
    /// Account nonce.
    pub nonce: u128,
    /// Tip.
    pub tip: u128,
    /// Runtime version the call was built for.
    pub spec_version: u32,
    /// Transaction format version.
    pub tx_version: u32,
    /// Network genesis hash.
    pub genesis_hash: GenesisHash,
    /// Era checkpoint block (genesis for immortal transactions).
    pub block_hash: Hash,
}

impl Extensions {
    /// Read extensions.
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            era: Era::decode(reader)?,
            nonce: reader.read_compact()?,
            tip: reader.read_compact()?,
            spec_version: reader.read_u32()?,
            tx_version: reader.read_u32()?,
            genesis_hash: reader.read_array()?,
            block_hash: reader.read_array()?,
        })
    }

    /// Append the encoding.
    pub fn encode(&self, out: &mut Vec<u8>) {
        self.era.encode(out);
        encode_compact(self.nonce, out);
        encode_compact(self.tip, out);
        out.extend_from_slice(&self.spec_version.to_le_bytes());
        out.extend_from_slice(&self.tx_version.to_le_bytes());
        out.extend_from_slice(&self.genesis_hash);
        out.extend_from_slice(&self.block_hash);
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

/// Transaction payload for `author` over an encoded `call`.
pub fn build_transaction(author: &MultiSigner, call: &[u8], extensions: &Extensions) -> Vec<u8> {
    let content = if extensions.era.is_mortal() {
        ContentKind::MortalTransaction
    } else {
        ContentKind::ImmortalTransaction
    };
    let mut out = Vec::new();
    Header::write(Some(author.encryption), content, &mut out);
    out.extend_from_slice(&author.public);
    encode_compact(call.len() as u128, &mut out);
    out.extend_from_slice(call);
    extensions.encode(&mut out);
    out.extend_from_slice(&extensions.genesis_hash);
    out
}

/// Message payload.
pub fn build_message(author: &MultiSigner, message: &str, genesis_hash: &GenesisHash) -> Vec<u8> {
    let mut out = Vec::new();
    Header::write(Some(author.encryption), ContentKind::Message, &mut out);
    out.extend_from_slice(&author.public);
    encode_compact(message.len() as u128, &mut out);
    out.extend_from_slice(message.as_bytes());
    out.extend_from_slice(genesis_hash);
    out
}

/// Metadata update, optionally signed.
///
/// The signature must cover `UpdateCandidate::metadata_message(blob, genesis_hash)`.
pub fn build_load_metadata(
    blob: &[u8],
    genesis_hash: &GenesisHash,
    signed: Option<(&MultiSigner, &[u8])>,
) -> Vec<u8> {
    let mut out = Vec::new();
    Header::write(signed.map(|(s, _)| s.encryption), ContentKind::LoadMetadata, &mut out);
    if let Some((signer, _)) = signed {
        out.extend_from_slice(&signer.public);
    }
    encode_compact(blob.len() as u128, &mut out);
    out.extend_from_slice(blob);
    out.extend_from_slice(genesis_hash);
    if let Some((_, signature)) = signed {
        out.extend_from_slice(signature);
    }
    out
}

/// Network specs update, optionally signed.
///
/// The signature must cover `specs.encode()`.
pub fn build_add_specs(specs: &NetworkSpecs, signed: Option<(&MultiSigner, &[u8])>) -> Vec<u8> {
    let encoded = specs.encode();
    let mut out = Vec::new();
    Header::write(signed.map(|(s, _)| s.encryption), ContentKind::AddSpecs, &mut out);
    if let Some((signer, _)) = signed {
        out.extend_from_slice(&signer.public);
    }
    encode_compact(encoded.len() as u128, &mut out);
    out.extend_from_slice(&encoded);
    if let Some((_, signature)) = signed {
        out.extend_from_slice(signature);
    }
    out
}
