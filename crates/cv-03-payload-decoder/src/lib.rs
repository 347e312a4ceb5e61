//! # Payload Decoder (cv-03)
//!
//! Turns scanned payload bytes into human-readable cards and the exact bytes
//! the signer will receive.
//!
//! ## Payload Envelope
//!
//! ```text
//! [0x53][scheme][content] author? body [genesis hash]
//!
//!   scheme : 00 ed25519 | 01 schnorr | 02 ecdsa | ff unsigned (updates only)
//!   content: 00 mortal tx | 02 immortal tx | 03 message | 80 load metadata | c1 add specs
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Determinism | Same bytes and metadata always give the same cards |
//! | 2 | Local Failure | An undecodable call becomes an error card; siblings still render |
//! | 3 | Exact Signable | Signed bytes are taken verbatim from the payload, never re-encoded |
//! | 4 | Honest Trust | Cards are Verified only under a pinned verifier and never in blind mode |
//! | 5 | Bounded Work | Call length and type nesting are capped |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Envelope parsing, call decoding, cards
//! - `ports/` - Port traits (inbound API, outbound metadata lookup)
//! - `service.rs` - Application service implementing the API
//!
//! ## Usage
//!
//! ```ignore
//! use cv_03_payload_decoder::{PayloadDecoderApi, PayloadDecoderService};
//!
//! let decoder = PayloadDecoderService::new(DecoderConfig::default(), lookup);
//! match decoder.parse(&payload)? {
//!     ParsedPayload::Transaction(tx) if tx.is_signable() => show(tx.cards()),
//!     other => handle(other),
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use domain::balance::{format_balance, Balance};
pub use domain::call::CallDecoder;
pub use domain::cards::{Card, CardContent, Trust};
pub use domain::config::{DecoderConfig, PREHASH_THRESHOLD};
pub use domain::envelope::{
    build_add_specs, build_load_metadata, build_message, build_transaction, ContentKind,
    Extensions, Header, PAYLOAD_PREFIX, UNSIGNED_MARKER,
};
pub use domain::era::Era;
pub use domain::errors::{CallError, DecodeError};
pub use domain::payload::{
    decode, decode_message, parse, parse_update, DecodedMessage, DecodedPayload, ParsedPayload,
};
pub use domain::update::update_cards;
pub use ports::inbound::PayloadDecoderApi;
pub use ports::outbound::{InMemoryMetadataLookup, MetadataLookup};
pub use service::PayloadDecoderService;
