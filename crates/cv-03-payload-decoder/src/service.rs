//! # Payload Decoder Service
//!
//! Binds the pure decoding functions to a metadata lookup and a config, and
//! logs the outcome of every decode. Payload bytes and message text are never
//! logged.

use crate::domain::cards::Card;
use crate::domain::config::DecoderConfig;
use crate::domain::errors::DecodeError;
use crate::domain::payload::{self, DecodedMessage, DecodedPayload, ParsedPayload};
use crate::domain::update;
use crate::ports::inbound::PayloadDecoderApi;
use crate::ports::outbound::MetadataLookup;
use shared_types::UpdateCandidate;
use std::sync::Arc;
use tracing::{debug, warn};

/// The Payload Decoder Service.
pub struct PayloadDecoderService<L: MetadataLookup> {
    config: DecoderConfig,
    lookup: Arc<L>,
}

impl<L: MetadataLookup> PayloadDecoderService<L> {
    /// Create the service.
    pub fn new(config: DecoderConfig, lookup: Arc<L>) -> Self {
        Self { config, lookup }
    }

    /// Configuration in use.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }
}

fn log_failure<T>(
    what: &'static str,
    payload_len: usize,
    result: Result<T, DecodeError>,
) -> Result<T, DecodeError> {
    if let Err(e) = &result {
        warn!(what, payload_len, error = %e, "Payload rejected");
    }
    result
}

impl<L: MetadataLookup> PayloadDecoderApi for PayloadDecoderService<L> {
    fn parse(&self, payload: &[u8]) -> Result<ParsedPayload, DecodeError> {
        match payload::parse(payload, &*self.lookup, &self.config) {
            Ok(ParsedPayload::Transaction(decoded)) => {
                self.log_transaction(&decoded);
                Ok(ParsedPayload::Transaction(decoded))
            }
            other => log_failure("payload", payload.len(), other),
        }
    }

    fn decode(&self, payload: &[u8]) -> Result<DecodedPayload, DecodeError> {
        let decoded = log_failure(
            "transaction",
            payload.len(),
            payload::decode(payload, &*self.lookup, &self.config),
        )?;
        self.log_transaction(&decoded);
        Ok(decoded)
    }

    fn decode_message(&self, payload: &[u8]) -> Result<DecodedMessage, DecodeError> {
        log_failure(
            "message",
            payload.len(),
            payload::decode_message(payload, &*self.lookup),
        )
    }

    fn parse_update(&self, payload: &[u8]) -> Result<UpdateCandidate, DecodeError> {
        let candidate = log_failure("update", payload.len(), payload::parse_update(payload))?;
        debug!(
            kind = ?candidate.kind(),
            genesis_hash = %hex::encode(candidate.genesis_hash()),
            verifier = %candidate.claimed_verifier(),
            "Update parsed"
        );
        Ok(candidate)
    }

    fn update_cards(&self, candidate: &UpdateCandidate) -> Vec<Card> {
        update::update_cards(candidate)
    }
}

impl<L: MetadataLookup> PayloadDecoderService<L> {
    fn log_transaction(&self, decoded: &DecodedPayload) {
        debug!(
            network = %decoded.network_name,
            spec_version = decoded.spec_version,
            blind = decoded.blind,
            mode = ?decoded.signing_mode(),
            errors = decoded.has_errors(),
            "Transaction decoded"
        );
    }
}
