//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identity**: `GenesisHash`, `Encryption`, `MultiSigner`
//! - **Trust**: `VerifierValue`, `Verifier`
//! - **Registry records**: `NetworkSpecs`, `MetadataRecord`

use crate::codec::{encode_str, ByteReader};
use crate::errors::CodecError;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte hash (BLAKE3 digest or genesis hash).
pub type Hash = [u8; 32];

/// Genesis hash identifying a network.
pub type GenesisHash = [u8; 32];

/// A 64-byte signature, common to all three schemes.
pub type SignatureBytes = [u8; 64];

/// Signature scheme of a key or network.
///
/// The wire byte is the second byte of every payload envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Encryption {
    /// Scheme A: Ed25519.
    Ed25519,
    /// Scheme B: BIP-340 Schnorr over secp256k1, x-only public keys.
    Schnorr,
    /// Scheme C: ECDSA over secp256k1, compressed public keys.
    Ecdsa,
}

impl Encryption {
    /// All supported schemes.
    pub const ALL: [Encryption; 3] = [Encryption::Ed25519, Encryption::Schnorr, Encryption::Ecdsa];

    /// Envelope byte for this scheme.
    pub fn wire_byte(self) -> u8 {
        match self {
            Encryption::Ed25519 => 0x00,
            Encryption::Schnorr => 0x01,
            Encryption::Ecdsa => 0x02,
        }
    }

    /// Parse an envelope byte.
    pub fn from_wire_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Encryption::Ed25519),
            0x01 => Some(Encryption::Schnorr),
            0x02 => Some(Encryption::Ecdsa),
            _ => None,
        }
    }

    /// Length of a public key in this scheme.
    pub fn public_key_len(self) -> usize {
        match self {
            Encryption::Ed25519 | Encryption::Schnorr => 32,
            Encryption::Ecdsa => 33,
        }
    }

    /// Length of a signature in this scheme.
    pub fn signature_len(self) -> usize {
        64
    }

    /// Lowercase display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Encryption::Ed25519 => "ed25519",
            Encryption::Schnorr => "schnorr",
            Encryption::Ecdsa => "ecdsa",
        }
    }
}

impl fmt::Display for Encryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A public key tagged with its scheme.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MultiSigner {
    /// Signature scheme.
    pub encryption: Encryption,
    /// Raw public key bytes (32 or 33 bytes depending on the scheme).
    pub public: Vec<u8>,
}

impl MultiSigner {
    /// Build a signer, checking the key length against the scheme.
    pub fn new(encryption: Encryption, public: Vec<u8>) -> Result<Self, CodecError> {
        if public.len() != encryption.public_key_len() {
            return Err(CodecError::Invalid(format!(
                "{} public key must be {} bytes, got {}",
                encryption,
                encryption.public_key_len(),
                public.len()
            )));
        }
        Ok(Self { encryption, public })
    }

    /// Hex form of the public key.
    pub fn public_hex(&self) -> String {
        hex::encode(&self.public)
    }
}

impl fmt::Display for MultiSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.encryption, self.public_hex())
    }
}

/// Parses the `Display` form, `<scheme>:<public key hex>`.
impl FromStr for MultiSigner {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, public) = s
            .split_once(':')
            .ok_or_else(|| CodecError::Invalid(format!("expected <scheme>:<hex>, got {s:?}")))?;
        let encryption = Encryption::ALL
            .into_iter()
            .find(|encryption| encryption.as_str() == scheme)
            .ok_or_else(|| CodecError::Invalid(format!("unknown scheme {scheme:?}")))?;
        let public = hex::decode(public.trim_start_matches("0x"))
            .map_err(|e| CodecError::Invalid(format!("public key is not hex: {e}")))?;
        Self::new(encryption, public)
    }
}

// =============================================================================
// CLUSTER B: TRUST
// =============================================================================

/// A concrete verifier key that signed a network's updates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerifierValue(pub MultiSigner);

/// Per-network verifier pin.
///
/// `Verifier(None)` means the network is known but its updates were never
/// signed. Once a pin holds a value it can only be replaced by the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Verifier(pub Option<VerifierValue>);

impl Verifier {
    /// The unverified pin.
    pub fn none() -> Self {
        Self(None)
    }

    /// Pin to a concrete signer.
    pub fn pinned(signer: MultiSigner) -> Self {
        Self(Some(VerifierValue(signer)))
    }

    /// Whether a concrete key is pinned.
    pub fn is_pinned(&self) -> bool {
        self.0.is_some()
    }

    /// The pinned signer, if any.
    pub fn signer(&self) -> Option<&MultiSigner> {
        self.0.as_ref().map(|v| &v.0)
    }
}

impl fmt::Display for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.signer() {
            Some(signer) => write!(f, "{signer}"),
            None => f.write_str("none"),
        }
    }
}

// =============================================================================
// CLUSTER C: REGISTRY RECORDS
// =============================================================================

/// Display and crypto settings for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSpecs {
    /// Network identity.
    pub genesis_hash: GenesisHash,
    /// Short machine name, e.g. `westend`.
    pub name: String,
    /// Human-readable title.
    pub title: String,
    /// Balance unit, e.g. `WND`.
    pub unit: String,
    /// Balance decimals.
    pub decimals: u8,
    /// Address format prefix.
    pub base58_prefix: u16,
    /// Signature scheme used by accounts on this network.
    pub encryption: Encryption,
    /// Suggested derivation path for new keys.
    pub default_path: String,
}

impl NetworkSpecs {
    /// Encode as carried in an add-specs payload.
    ///
    /// Layout: `base58_prefix u16le · decimals u8 · scheme u8 · genesis (32) ·
    /// name · title · unit · default_path`.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.name.len() + self.title.len());
        out.extend_from_slice(&self.base58_prefix.to_le_bytes());
        out.push(self.decimals);
        out.push(self.encryption.wire_byte());
        out.extend_from_slice(&self.genesis_hash);
        encode_str(&self.name, &mut out);
        encode_str(&self.title, &mut out);
        encode_str(&self.unit, &mut out);
        encode_str(&self.default_path, &mut out);
        out
    }

    /// Decode an add-specs body. The whole input must be consumed.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = ByteReader::new(bytes);
        let base58_prefix = reader.read_u16()?;
        let decimals = reader.read_u8()?;
        let scheme = reader.read_u8()?;
        let encryption = Encryption::from_wire_byte(scheme).ok_or(CodecError::UnknownTag {
            what: "encryption",
            tag: scheme,
        })?;
        let genesis_hash = reader.read_array::<32>()?;
        let specs = Self {
            genesis_hash,
            name: reader.read_string()?,
            title: reader.read_string()?,
            unit: reader.read_string()?,
            decimals,
            base58_prefix,
            encryption,
            default_path: reader.read_string()?,
        };
        reader.finish()?;
        if specs.name.is_empty() {
            return Err(CodecError::Invalid("network name is empty".into()));
        }
        Ok(specs)
    }

    /// Hex form of the genesis hash.
    pub fn genesis_hex(&self) -> String {
        hex::encode(self.genesis_hash)
    }
}

/// One accepted metadata version of one network.
///
/// Unique per `(genesis_hash, spec_version)` and immutable once stored.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Network identity.
    pub genesis_hash: GenesisHash,
    /// Runtime name declared inside the blob.
    pub name: String,
    /// Runtime spec version declared inside the blob.
    pub spec_version: u32,
    /// The raw blob, kept verbatim.
    #[serde_as(as = "Bytes")]
    pub blob: Vec<u8>,
    /// Verifier that signed this version when it was accepted.
    pub verifier: Verifier,
}
