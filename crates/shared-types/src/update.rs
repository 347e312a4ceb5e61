//! # Update Candidates
//!
//! A registry update parsed from a `LOAD_METADATA` or `ADD_NETWORK_SPEC`
//! payload, carried unevaluated until the registry decides whether to
//! accept it.

use crate::codec::encode_compact;
use crate::entities::{GenesisHash, MultiSigner, NetworkSpecs, Verifier};
use crate::errors::CodecError;
use crate::metadata::RuntimeMetadata;
use serde::{Deserialize, Serialize};

/// Which registry operation a candidate requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateKind {
    LoadMetadata,
    AddSpecs,
}

/// Signer and signature attached to a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBy {
    /// Claimed verifier key.
    pub signer: MultiSigner,
    /// Signature over the candidate's signed message.
    pub signature: Vec<u8>,
}

/// What the candidate would add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateContent {
    /// A metadata version for a known network.
    Metadata {
        genesis_hash: GenesisHash,
        name: String,
        spec_version: u32,
        blob: Vec<u8>,
    },
    /// Specs for a network.
    NetworkSpecs(NetworkSpecs),
}

/// An update awaiting the registry's decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCandidate {
    /// Proposed content.
    pub content: CandidateContent,
    /// Signature, absent for unsigned updates.
    pub signed_by: Option<SignedBy>,
    /// Exact bytes the signature must cover.
    pub signed_message: Vec<u8>,
}

impl UpdateCandidate {
    /// Build an unsigned metadata candidate, reading name and version from the blob.
    pub fn metadata(genesis_hash: GenesisHash, blob: Vec<u8>) -> Result<Self, CodecError> {
        let parsed = RuntimeMetadata::decode(&blob)?;
        let signed_message = Self::metadata_message(&blob, &genesis_hash);
        Ok(Self {
            content: CandidateContent::Metadata {
                genesis_hash,
                name: parsed.spec_name,
                spec_version: parsed.spec_version,
                blob,
            },
            signed_by: None,
            signed_message,
        })
    }

    /// Build an unsigned network specs candidate.
    pub fn network_specs(specs: NetworkSpecs) -> Self {
        let signed_message = specs.encode();
        Self {
            content: CandidateContent::NetworkSpecs(specs),
            signed_by: None,
            signed_message,
        }
    }

    /// Attach a signature.
    pub fn with_signature(mut self, signer: MultiSigner, signature: Vec<u8>) -> Self {
        self.signed_by = Some(SignedBy { signer, signature });
        self
    }

    /// Message covered by a metadata signature: `compact(len) · blob · genesis`.
    pub fn metadata_message(blob: &[u8], genesis_hash: &GenesisHash) -> Vec<u8> {
        let mut out = Vec::with_capacity(blob.len() + 37);
        encode_compact(blob.len() as u128, &mut out);
        out.extend_from_slice(blob);
        out.extend_from_slice(genesis_hash);
        out
    }

    /// Requested operation.
    pub fn kind(&self) -> UpdateKind {
        match self.content {
            CandidateContent::Metadata { .. } => UpdateKind::LoadMetadata,
            CandidateContent::NetworkSpecs(_) => UpdateKind::AddSpecs,
        }
    }

    /// Network the candidate targets.
    pub fn genesis_hash(&self) -> GenesisHash {
        match &self.content {
            CandidateContent::Metadata { genesis_hash, .. } => *genesis_hash,
            CandidateContent::NetworkSpecs(specs) => specs.genesis_hash,
        }
    }

    /// Verifier the candidate claims; `Verifier(None)` when unsigned.
    pub fn claimed_verifier(&self) -> Verifier {
        match &self.signed_by {
            Some(signed) => Verifier::pinned(signed.signer.clone()),
            None => Verifier::none(),
        }
    }
}
