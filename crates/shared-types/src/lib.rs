//! # Shared Types Crate
//!
//! Domain entities shared by every vault subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: network identity, verifiers, network specs and
//!   update candidates are defined once and consumed by every subsystem.
//! - **Closed Sum Types**: everything that crosses the render boundary is an
//!   enum with a fixed set of variants.
//! - **Canonical Encodings**: the compact codec rejects non-canonical input so
//!   identical payloads always decode to identical values.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod codec;
pub mod entities;
pub mod errors;
pub mod history;
pub mod metadata;
pub mod signable;
pub mod update;

pub use codec::{encode_compact, encode_str, ByteReader};
pub use entities::*;
pub use errors::CodecError;
pub use history::{HistoryEntry, HistoryEvent};
pub use metadata::{
    Field, PalletMeta, PortableType, Primitive, RuntimeMetadata, TypeDef, TypeId, VariantDef,
};
pub use signable::{SignablePayload, SigningMode};
pub use update::{CandidateContent, SignedBy, UpdateCandidate, UpdateKind};
