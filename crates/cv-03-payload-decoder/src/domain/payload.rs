//! # Payload Decoding
//!
//! Entry points turning raw scanned bytes into something the navigation layer
//! can show: a decoded transaction, a message, or a registry update candidate.
//!
//! Transaction decoding order:
//!
//! 1. header and author key
//! 2. trailing genesis hash, then the length-prefixed call (skipped)
//! 3. extensions, which carry the spec version needed for lookup
//! 4. network specs and metadata lookup
//! 5. call decoding, or a blind card

use super::balance::format_balance;
use super::call::CallDecoder;
use super::cards::{Card, CardContent, Trust};
use super::config::{DecoderConfig, PREHASH_THRESHOLD};
use super::envelope::{read_signer, ContentKind, Extensions, Header};
use super::era::Era;
use super::errors::DecodeError;
use crate::ports::outbound::MetadataLookup;
use serde::{Deserialize, Serialize};
use shared_types::{
    ByteReader, CodecError, Encryption, GenesisHash, MultiSigner, NetworkSpecs, SignablePayload,
    SigningMode, UpdateCandidate,
};

/// Wrapper around signed message text.
const MESSAGE_OPEN: &[u8] = b"<Bytes>";
const MESSAGE_CLOSE: &[u8] = b"</Bytes>";

/// A decoded transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedPayload {
    /// Network.
    pub genesis_hash: GenesisHash,
    /// Network name from its specs.
    pub network_name: String,
    /// Runtime version declared in the extensions.
    pub spec_version: u32,
    /// Key expected to sign.
    pub author: MultiSigner,
    /// Call card tree (a single `Blind` card in blind mode).
    pub call: Card,
    /// Extension cards.
    pub extensions: Vec<Card>,
    /// Payload-level warnings.
    pub warnings: Vec<Card>,
    /// Validity window.
    pub era: Era,
    /// Account nonce.
    pub nonce: u128,
    /// Tip.
    pub tip: u128,
    /// Whether the call was not decoded.
    pub blind: bool,
    /// Whether blind signing was enabled when this was decoded.
    pub blind_allowed: bool,
    /// What the signer will receive.
    pub signable: SignablePayload,
}

impl DecodedPayload {
    /// Signing mode of the payload.
    pub fn signing_mode(&self) -> SigningMode {
        self.signable.mode
    }

    /// Whether any card is an error.
    pub fn has_errors(&self) -> bool {
        self.call.has_errors() || self.extensions.iter().any(Card::has_errors)
    }

    /// Whether the user may approve signing.
    pub fn is_signable(&self) -> bool {
        !self.has_errors() && (!self.blind || self.blind_allowed)
    }

    /// All cards in display order: warnings, author, call tree, extensions.
    pub fn cards(&self) -> Vec<Card> {
        let mut cards = self.warnings.clone();
        cards.push(Card::new(
            CardContent::Author {
                signer: self.author.clone(),
            },
            0,
        ));
        cards.push(self.call.clone());
        cards.extend(self.extensions.iter().cloned());
        cards
    }
}

/// A decoded text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedMessage {
    /// Network.
    pub genesis_hash: GenesisHash,
    /// Network name from its specs.
    pub network_name: String,
    /// Key expected to sign.
    pub author: MultiSigner,
    /// Message text.
    pub message: String,
    /// Text card.
    pub card: Card,
    /// What the signer will receive.
    pub signable: SignablePayload,
}

/// Any payload the vault understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParsedPayload {
    /// Transaction to sign.
    Transaction(Box<DecodedPayload>),
    /// Message to sign.
    Message(DecodedMessage),
    /// Registry update to review.
    Update(UpdateCandidate),
}

/// Decode any payload, dispatching on its content byte.
pub fn parse(
    payload: &[u8],
    lookup: &dyn MetadataLookup,
    config: &DecoderConfig,
) -> Result<ParsedPayload, DecodeError> {
    let header = Header::peek(payload)?;
    match header.content {
        ContentKind::MortalTransaction | ContentKind::ImmortalTransaction => {
            decode(payload, lookup, config).map(|d| ParsedPayload::Transaction(Box::new(d)))
        }
        ContentKind::Message => decode_message(payload, lookup).map(ParsedPayload::Message),
        ContentKind::LoadMetadata | ContentKind::AddSpecs => {
            parse_update(payload).map(ParsedPayload::Update)
        }
    }
}

/// Decode a transaction payload.
pub fn decode(
    payload: &[u8],
    lookup: &dyn MetadataLookup,
    config: &DecoderConfig,
) -> Result<DecodedPayload, DecodeError> {
    let mut reader = ByteReader::new(payload);
    let header = Header::read(&mut reader)?;
    if !header.content.is_transaction() {
        return Err(DecodeError::WrongKind {
            expected: "transaction",
            found: header.content.byte(),
        });
    }
    let scheme = header
        .scheme
        .ok_or(DecodeError::MissingAuthor(header.content.byte()))?;
    let author = read_signer(&mut reader, scheme)?;
    let genesis_hash = read_trailing_genesis(&mut reader)?;

    let call = reader.read_len_prefixed()?;
    let extensions_start = reader.position();
    let extensions = Extensions::decode(&mut reader)?;
    let extensions_end = reader.position();
    reader.finish()?;

    if extensions.genesis_hash != genesis_hash {
        return Err(DecodeError::GenesisMismatch);
    }
    match (header.content, extensions.era.is_mortal()) {
        (ContentKind::MortalTransaction, false) => {
            return Err(DecodeError::EraMismatch("mortal transaction with immortal era"))
        }
        (ContentKind::ImmortalTransaction, true) => {
            return Err(DecodeError::EraMismatch("immortal transaction with mortal era"))
        }
        _ => {}
    }

    let specs = network(lookup, &genesis_hash, scheme)?;
    let spec_version = extensions.spec_version;
    let metadata = lookup.metadata(&genesis_hash, spec_version);

    let mut warnings = Vec::new();
    let too_long = call.len() > config.max_decodable_call_len;
    let (mut call_card, blind) = match metadata {
        Some(metadata) if !too_long => (
            CallDecoder::new(&metadata, &specs, config.max_type_depth).decode_call(call, 0),
            false,
        ),
        Some(_) => {
            warnings.push(Card::warning(
                format!(
                    "Call of {} bytes exceeds the {} byte decoding limit",
                    call.len(),
                    config.max_decodable_call_len
                ),
                0,
            ));
            (blind_card(call), true)
        }
        None if config.allow_blind_signing => {
            warnings.push(Card::warning(
                format!("No metadata for {} version {spec_version}", specs.name),
                0,
            ));
            (blind_card(call), true)
        }
        None => {
            return Err(DecodeError::NoMetadata {
                network: specs.name.clone(),
                spec_version,
            })
        }
    };

    if let Some(latest) = lookup.latest_version(&genesis_hash) {
        if latest > spec_version {
            warnings.push(Card::warning(
                format!(
                    "Transaction uses {} metadata version {spec_version}; \
                     version {latest} is available",
                    specs.name
                ),
                0,
            ));
        }
    }

    let mut extension_cards = extension_cards(&extensions, &specs);
    if blind {
        call_card.mark_all(Trust::Unverified);
        for card in extension_cards.iter_mut().chain(warnings.iter_mut()) {
            card.mark_all(Trust::Unverified);
        }
    } else {
        let trust = base_trust(lookup, &genesis_hash);
        call_card.mark(trust);
        for card in &mut extension_cards {
            card.mark(trust);
        }
    }

    let mut signed_bytes = call.to_vec();
    signed_bytes.extend_from_slice(&payload[extensions_start..extensions_end]);

    Ok(DecodedPayload {
        genesis_hash,
        network_name: specs.name,
        spec_version,
        author,
        call: call_card,
        extensions: extension_cards,
        warnings,
        era: extensions.era,
        nonce: extensions.nonce,
        tip: extensions.tip,
        blind,
        blind_allowed: config.allow_blind_signing,
        signable: signable(genesis_hash, signed_bytes, blind),
    })
}

/// Decode a message payload.
pub fn decode_message(
    payload: &[u8],
    lookup: &dyn MetadataLookup,
) -> Result<DecodedMessage, DecodeError> {
    let mut reader = ByteReader::new(payload);
    let header = Header::read(&mut reader)?;
    if header.content != ContentKind::Message {
        return Err(DecodeError::WrongKind {
            expected: "message",
            found: header.content.byte(),
        });
    }
    let scheme = header
        .scheme
        .ok_or(DecodeError::MissingAuthor(header.content.byte()))?;
    let author = read_signer(&mut reader, scheme)?;
    let genesis_hash = read_trailing_genesis(&mut reader)?;

    let offset = reader.position();
    let bytes = reader.read_len_prefixed()?;
    reader.finish()?;
    let message =
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8 { offset })?;

    let specs = network(lookup, &genesis_hash, scheme)?;
    let mut card = Card::new(CardContent::Text(message.clone()), 0);
    card.mark(base_trust(lookup, &genesis_hash));

    let mut wrapped = Vec::with_capacity(MESSAGE_OPEN.len() + bytes.len() + MESSAGE_CLOSE.len());
    wrapped.extend_from_slice(MESSAGE_OPEN);
    wrapped.extend_from_slice(bytes);
    wrapped.extend_from_slice(MESSAGE_CLOSE);

    Ok(DecodedMessage {
        genesis_hash,
        network_name: specs.name,
        author,
        message,
        card,
        signable: signable(genesis_hash, wrapped, false),
    })
}

/// Parse a `LOAD_METADATA` or `ADD_SPECS` payload into a candidate.
///
/// The signature is extracted but not checked; the registry checks it.
pub fn parse_update(payload: &[u8]) -> Result<UpdateCandidate, DecodeError> {
    let mut reader = ByteReader::new(payload);
    let header = Header::read(&mut reader)?;
    let signer = header
        .scheme
        .map(|scheme| read_signer(&mut reader, scheme))
        .transpose()?;

    let candidate = match header.content {
        ContentKind::LoadMetadata => {
            let blob = reader.read_len_prefixed()?;
            let genesis_hash: GenesisHash = reader.read_array()?;
            UpdateCandidate::metadata(genesis_hash, blob.to_vec())?
        }
        ContentKind::AddSpecs => {
            let encoded = reader.read_len_prefixed()?;
            UpdateCandidate::network_specs(NetworkSpecs::decode(encoded)?)
        }
        other => {
            return Err(DecodeError::WrongKind {
                expected: "update",
                found: other.byte(),
            })
        }
    };

    let candidate = match signer {
        Some(signer) => {
            let signature = reader.read_bytes(signer.encryption.signature_len())?.to_vec();
            candidate.with_signature(signer, signature)
        }
        None => candidate,
    };
    reader.finish()?;
    Ok(candidate)
}

fn read_trailing_genesis(reader: &mut ByteReader<'_>) -> Result<GenesisHash, DecodeError> {
    let tail = reader.split_tail(32)?;
    let mut genesis_hash = [0u8; 32];
    genesis_hash.copy_from_slice(tail);
    Ok(genesis_hash)
}

fn network(
    lookup: &dyn MetadataLookup,
    genesis_hash: &GenesisHash,
    scheme: Encryption,
) -> Result<NetworkSpecs, DecodeError> {
    let specs = lookup
        .network_specs(genesis_hash)
        .ok_or_else(|| DecodeError::UnknownNetwork(hex::encode(genesis_hash)))?;
    if specs.encryption != scheme {
        return Err(DecodeError::SchemeMismatch {
            network: specs.name,
            expected: specs.encryption,
            found: scheme,
        });
    }
    Ok(specs)
}

fn base_trust(lookup: &dyn MetadataLookup, genesis_hash: &GenesisHash) -> Trust {
    match lookup.verifier(genesis_hash) {
        Some(verifier) if verifier.is_pinned() => Trust::Verified,
        _ => Trust::Unverified,
    }
}

fn blind_card(call: &[u8]) -> Card {
    Card::new(
        CardContent::Blind {
            digest: hex::encode(shared_crypto::blake3_hash(call)),
        },
        0,
    )
}

fn signable(genesis_hash: GenesisHash, bytes: Vec<u8>, force_prehash: bool) -> SignablePayload {
    if force_prehash || bytes.len() > PREHASH_THRESHOLD {
        SignablePayload {
            genesis_hash,
            mode: SigningMode::PreHashed,
            bytes: shared_crypto::blake3_hash(&bytes).to_vec(),
        }
    } else {
        SignablePayload {
            genesis_hash,
            mode: SigningMode::Plain,
            bytes,
        }
    }
}

fn extension_cards(extensions: &Extensions, specs: &NetworkSpecs) -> Vec<Card> {
    let mut cards = vec![
        Card::new(CardContent::Era(extensions.era), 0),
        Card::new(CardContent::Nonce(extensions.nonce.to_string()), 0),
        Card::new(
            CardContent::Tip(format_balance(extensions.tip, specs.decimals, &specs.unit)),
            0,
        ),
        Card::new(
            CardContent::NetworkInfo {
                name: specs.name.clone(),
                spec_version: extensions.spec_version,
            },
            0,
        ),
        Card::new(CardContent::TxVersion(extensions.tx_version), 0),
    ];
    if extensions.era.is_mortal() {
        cards.push(Card::new(
            CardContent::BlockHash(hex::encode(extensions.block_hash)),
            0,
        ));
    }
    cards
}
