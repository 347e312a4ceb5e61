//! # Transaction Era
//!
//! `0x00` is immortal. A mortal era is two bytes, little-endian `u16`:
//! the low 4 bits hold `log2(period) - 1`, the high 12 bits the phase
//! divided by the quantize factor `max(period >> 12, 1)`.

use super::errors::DecodeError;
use serde::{Deserialize, Serialize};
use shared_types::ByteReader;

/// Validity window of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Era {
    /// Valid forever.
    Immortal,
    /// Valid for `period` blocks starting at `phase`.
    Mortal {
        /// Position inside the period.
        phase: u64,
        /// Window length, a power of two in `4..=65536`.
        period: u64,
    },
}

impl Era {
    /// Whether this is a mortal era.
    pub fn is_mortal(&self) -> bool {
        matches!(self, Era::Mortal { .. })
    }

    /// Read an era from the reader.
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let first = reader.read_u8()?;
        if first == 0 {
            return Ok(Era::Immortal);
        }
        let second = reader.read_u8()?;
        let encoded = u64::from(u16::from_le_bytes([first, second]));

        let period = 2u64 << (encoded % (1 << 4));
        let quantize_factor = (period >> 12).max(1);
        let phase = (encoded >> 4) * quantize_factor;
        if period >= 4 && phase < period {
            Ok(Era::Mortal { phase, period })
        } else {
            Err(DecodeError::InvalidEra)
        }
    }

    /// Append the encoding of this era.
    ///
    /// A mortal period is rounded up to a power of two within `4..=65536` and
    /// the phase is quantized, as the chain does when signing.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match *self {
            Era::Immortal => out.push(0),
            Era::Mortal { phase, period } => {
                let period = period
                    .checked_next_power_of_two()
                    .unwrap_or(1 << 16)
                    .clamp(4, 1 << 16);
                let phase = phase % period;
                let quantize_factor = (period >> 12).max(1);
                let low = u64::from(period.trailing_zeros().saturating_sub(1)).clamp(1, 15);
                let encoded = low | ((phase / quantize_factor) << 4);
                out.extend_from_slice(&(encoded as u16).to_le_bytes());
            }
        }
    }
}

impl std::fmt::Display for Era {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Era::Immortal => write!(f, "Immortal"),
            Era::Mortal { phase, period } => write!(f, "Mortal, phase: {phase}, period: {period}"),
        }
    }
}
