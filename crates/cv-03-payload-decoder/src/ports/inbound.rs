//! # Inbound Ports (Driving Ports / API)

use crate::domain::cards::Card;
use crate::domain::errors::DecodeError;
use crate::domain::payload::{DecodedMessage, DecodedPayload, ParsedPayload};
use shared_types::UpdateCandidate;

/// Primary Payload Decoder API.
///
/// Every method is a pure function of the input bytes and the current
/// metadata; calling twice with the same inputs gives identical output.
pub trait PayloadDecoderApi: Send + Sync {
    /// Decode any supported payload.
    fn parse(&self, payload: &[u8]) -> Result<ParsedPayload, DecodeError>;

    /// Decode a transaction.
    fn decode(&self, payload: &[u8]) -> Result<DecodedPayload, DecodeError>;

    /// Decode a text message.
    fn decode_message(&self, payload: &[u8]) -> Result<DecodedMessage, DecodeError>;

    /// Parse a registry update without checking its signature.
    fn parse_update(&self, payload: &[u8]) -> Result<UpdateCandidate, DecodeError>;

    /// Preview cards for an update.
    fn update_cards(&self, candidate: &UpdateCandidate) -> Vec<Card>;
}
