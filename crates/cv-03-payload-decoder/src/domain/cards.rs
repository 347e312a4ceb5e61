//! # Card Tree
//!
//! Decoded payloads are rendered as an ordered tree of cards. The render
//! layer walks it with `flatten` and indents each card by its `depth`.

use super::balance::Balance;
use super::era::Era;
use serde::{Deserialize, Serialize};
use shared_types::{MultiSigner, NetworkSpecs, Verifier};

/// How much a card can be relied on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trust {
    /// Decoded with metadata from a pinned verifier.
    Verified,
    /// Decoded with unverified metadata, or not decoded at all.
    Unverified,
    /// Something the user must look at before approving.
    Warning,
}

/// What a card shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardContent {
    // =========================================================================
    // Call structure
    // =========================================================================
    /// A call: pallet and method names.
    Call {
        /// Pallet name.
        pallet: String,
        /// Call name.
        method: String,
    },
    /// Named argument or struct field.
    FieldName {
        /// Field name.
        name: String,
        /// Declared type name, if any.
        type_name: Option<String>,
    },
    /// Positional argument or tuple field.
    FieldNumber(usize),
    /// Selected enum variant.
    EnumVariant(String),

    // =========================================================================
    // Values
    // =========================================================================
    /// Balance amount in network units.
    Balance(Balance),
    /// Plain integer, decimal.
    Number(String),
    /// Boolean.
    Bool(bool),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes, hex.
    Bytes(String),
    /// Account id, hex.
    Id(String),
    /// Empty value (unit variant payload, empty tuple).
    None,

    // =========================================================================
    // Envelope and extensions
    // =========================================================================
    /// Key expected to sign the payload.
    Author {
        /// Signer identity.
        signer: MultiSigner,
    },
    /// Transaction era.
    Era(Era),
    /// Account nonce.
    Nonce(String),
    /// Tip paid to the block author.
    Tip(Balance),
    /// Network name and runtime version used for decoding.
    NetworkInfo {
        /// Network name.
        name: String,
        /// Spec version.
        spec_version: u32,
    },
    /// Transaction format version.
    TxVersion(u32),
    /// Checkpoint block hash, hex.
    BlockHash(String),
    /// Call that could not be decoded; signed as its digest.
    Blind {
        /// BLAKE3 digest of the call, hex.
        digest: String,
    },

    // =========================================================================
    // Registry updates
    // =========================================================================
    /// Metadata offered for a network.
    MetadataUpdate {
        /// Network name.
        name: String,
        /// Spec version.
        spec_version: u32,
    },
    /// Network specs offered.
    NetworkSpecsUpdate(NetworkSpecs),
    /// Verifier that signed an update.
    UpdateVerifier(Verifier),

    // =========================================================================
    // Diagnostics
    // =========================================================================
    /// Something worth a second look; does not block signing.
    Warning(String),
    /// A call or value that failed to decode; blocks signing.
    Error(String),
}

impl CardContent {
    /// Whether this content is a diagnostic.
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, CardContent::Warning(_) | CardContent::Error(_))
    }

    /// Short type label for the render layer.
    pub fn label(&self) -> &'static str {
        match self {
            CardContent::Call { .. } => "call",
            CardContent::FieldName { .. } => "field_name",
            CardContent::FieldNumber(_) => "field_number",
            CardContent::EnumVariant(_) => "enum_variant_name",
            CardContent::Balance(_) => "balance",
            CardContent::Number(_) => "default",
            CardContent::Bool(_) => "bool",
            CardContent::Text(_) => "text",
            CardContent::Bytes(_) => "bytes",
            CardContent::Id(_) => "Id",
            CardContent::None => "none",
            CardContent::Author { .. } => "author",
            CardContent::Era(_) => "era",
            CardContent::Nonce(_) => "nonce",
            CardContent::Tip(_) => "tip",
            CardContent::NetworkInfo { .. } => "network_info",
            CardContent::TxVersion(_) => "tx_version",
            CardContent::BlockHash(_) => "block_hash",
            CardContent::Blind { .. } => "blind",
            CardContent::MetadataUpdate { .. } => "meta",
            CardContent::NetworkSpecsUpdate(_) => "new_specs",
            CardContent::UpdateVerifier(_) => "verifier",
            CardContent::Warning(_) => "warning",
            CardContent::Error(_) => "error",
        }
    }
}

/// One node of the card tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// What is shown.
    pub content: CardContent,
    /// Indentation level.
    pub depth: u32,
    /// Trust marker.
    pub trust: Trust,
    /// Nested cards, in order.
    pub children: Vec<Card>,
}

impl Card {
    /// Leaf card. Diagnostics start as `Warning`, everything else `Unverified`.
    pub fn new(content: CardContent, depth: u32) -> Self {
        let trust = if content.is_diagnostic() {
            Trust::Warning
        } else {
            Trust::Unverified
        };
        Self {
            content,
            depth,
            trust,
            children: Vec::new(),
        }
    }

    /// Card with children.
    pub fn with_children(content: CardContent, depth: u32, children: Vec<Card>) -> Self {
        Self {
            children,
            ..Self::new(content, depth)
        }
    }

    /// Error card.
    pub fn error(message: impl Into<String>, depth: u32) -> Self {
        Self::new(CardContent::Error(message.into()), depth)
    }

    /// Warning card.
    pub fn warning(message: impl Into<String>, depth: u32) -> Self {
        Self::new(CardContent::Warning(message.into()), depth)
    }

    /// Pre-order walk of this card and its descendants.
    pub fn flatten(&self) -> Vec<&Card> {
        let mut out = Vec::new();
        self.walk(&mut out);
        out
    }

    fn walk<'a>(&'a self, out: &mut Vec<&'a Card>) {
        out.push(self);
        for child in &self.children {
            child.walk(out);
        }
    }

    /// Set `trust` on every non-diagnostic card of the subtree.
    pub fn mark(&mut self, trust: Trust) {
        if !self.content.is_diagnostic() {
            self.trust = trust;
        }
        for child in &mut self.children {
            child.mark(trust);
        }
    }

    /// Set `trust` on every card of the subtree, diagnostics included.
    pub fn mark_all(&mut self, trust: Trust) {
        self.trust = trust;
        for child in &mut self.children {
            child.mark_all(trust);
        }
    }

    /// Whether any card in the subtree is an error.
    pub fn has_errors(&self) -> bool {
        matches!(self.content, CardContent::Error(_)) || self.children.iter().any(Card::has_errors)
    }
}
