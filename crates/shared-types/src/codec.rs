//! # Compact Codec
//!
//! Length prefixes and integers on the wire use the SCALE compact encoding:
//!
//! | Low bits | Mode          | Range                  |
//! |----------|---------------|------------------------|
//! | `0b00`   | single byte   | `0..=63`               |
//! | `0b01`   | two bytes     | `64..=16_383`          |
//! | `0b10`   | four bytes    | `16_384..=2^30 - 1`    |
//! | `0b11`   | big integer   | `2^30..`, up to 16 LE bytes |
//!
//! Decoding is strict: a value encoded in a wider mode than necessary is
//! rejected, which keeps every payload's decoding unique.

use crate::errors::CodecError;

const SINGLE_MAX: u128 = 0x3f;
const TWO_BYTE_MAX: u128 = 0x3fff;
const FOUR_BYTE_MAX: u128 = 0x3fff_ffff;

/// Append the compact encoding of `value` to `out`.
pub fn encode_compact(value: u128, out: &mut Vec<u8>) {
    if value <= SINGLE_MAX {
        out.push((value as u8) << 2);
    } else if value <= TWO_BYTE_MAX {
        out.extend_from_slice(&(((value as u16) << 2) | 0b01).to_le_bytes());
    } else if value <= FOUR_BYTE_MAX {
        out.extend_from_slice(&(((value as u32) << 2) | 0b10).to_le_bytes());
    } else {
        let bytes = value.to_le_bytes();
        let len = 16 - (value.leading_zeros() as usize / 8);
        out.push((((len - 4) as u8) << 2) | 0b11);
        out.extend_from_slice(&bytes[..len]);
    }
}

/// Compact-encode a value into a fresh buffer.
pub fn compact_bytes(value: u128) -> Vec<u8> {
    let mut out = Vec::with_capacity(5);
    encode_compact(value, &mut out);
    out
}

/// Append a compact-length-prefixed byte string.
pub fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    encode_compact(bytes.len() as u128, out);
    out.extend_from_slice(bytes);
}

/// Append a compact-length-prefixed UTF-8 string.
pub fn encode_str(value: &str, out: &mut Vec<u8>) {
    encode_bytes(value.as_bytes(), out);
}

/// Cursor over an untrusted byte slice.
///
/// Every read is bounds-checked and reports the offset at which it failed.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Start reading at the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether every byte was consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread tail, without consuming it.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Fail unless the input was consumed exactly.
    pub fn finish(&self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }

    /// Consume `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < len {
            return Err(CodecError::UnexpectedEof {
                offset: self.pos,
                needed: len,
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Consume a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Split `len` bytes off from the end of the input, shrinking the reader.
    pub fn split_tail(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < len {
            return Err(CodecError::UnexpectedEof {
                offset: self.pos,
                needed: len,
            });
        }
        let end = self.data.len();
        let tail = &self.data[end - len..];
        self.data = &self.data[..end - len];
        Ok(tail)
    }

    /// Consume one byte.
    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Consume a little-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Consume a little-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Consume a little-endian `u64`.
    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Consume a little-endian `u128`.
    pub fn read_u128(&mut self) -> Result<u128, CodecError> {
        Ok(u128::from_le_bytes(self.read_array()?))
    }

    /// Consume a compact integer, rejecting non-canonical encodings.
    pub fn read_compact(&mut self) -> Result<u128, CodecError> {
        let offset = self.pos;
        let first = self.read_u8()?;
        let value = match first & 0b11 {
            0b00 => u128::from(first >> 2),
            0b01 => {
                let second = self.read_u8()?;
                let value = u128::from(u16::from_le_bytes([first, second]) >> 2);
                if value <= SINGLE_MAX {
                    return Err(CodecError::NonCanonicalCompact { offset });
                }
                value
            }
            0b10 => {
                let rest = self.read_array::<3>()?;
                let raw = u32::from_le_bytes([first, rest[0], rest[1], rest[2]]);
                let value = u128::from(raw >> 2);
                if value <= TWO_BYTE_MAX {
                    return Err(CodecError::NonCanonicalCompact { offset });
                }
                value
            }
            _ => {
                let len = usize::from(first >> 2) + 4;
                if len > 16 {
                    return Err(CodecError::CompactOverflow { target: "u128" });
                }
                let bytes = self.read_bytes(len)?;
                if bytes[len - 1] == 0 {
                    return Err(CodecError::NonCanonicalCompact { offset });
                }
                let mut buf = [0u8; 16];
                buf[..len].copy_from_slice(bytes);
                let value = u128::from_le_bytes(buf);
                if value <= FOUR_BYTE_MAX {
                    return Err(CodecError::NonCanonicalCompact { offset });
                }
                value
            }
        };
        Ok(value)
    }

    /// Consume a compact integer used as a length or count.
    pub fn read_compact_len(&mut self) -> Result<usize, CodecError> {
        usize::try_from(self.read_compact()?)
            .map_err(|_| CodecError::CompactOverflow { target: "usize" })
    }

    /// Consume a compact integer that must fit in `u32`.
    pub fn read_compact_u32(&mut self) -> Result<u32, CodecError> {
        u32::try_from(self.read_compact()?)
            .map_err(|_| CodecError::CompactOverflow { target: "u32" })
    }

    /// Consume a compact-length-prefixed byte string.
    pub fn read_len_prefixed(&mut self) -> Result<&'a [u8], CodecError> {
        let len = self.read_compact_len()?;
        self.read_bytes(len)
    }

    /// Consume a compact-length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let offset = self.pos;
        let bytes = self.read_len_prefixed()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8 { offset })
    }

    /// Consume a `0x00` / `0x01` option tag.
    pub fn read_option_tag(&mut self) -> Result<bool, CodecError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            tag => Err(CodecError::UnknownTag {
                what: "option",
                tag,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_compact_mode_boundaries() {
        assert_eq!(compact_bytes(0), vec![0x00]);
        assert_eq!(compact_bytes(63), vec![0xfc]);
        assert_eq!(compact_bytes(64), vec![0x01, 0x01]);
        assert_eq!(compact_bytes(16_383), vec![0xfd, 0xff]);
        assert_eq!(compact_bytes(16_384), vec![0x02, 0x00, 0x01, 0x00]);
        assert_eq!(compact_bytes(1 << 30), vec![0x03, 0x00, 0x00, 0x00, 0x40]);
    }

    #[test]
    fn test_reject_non_canonical_two_byte() {
        // 1 encoded in two-byte mode
        let mut reader = ByteReader::new(&[0x05, 0x00]);
        assert_eq!(
            reader.read_compact(),
            Err(CodecError::NonCanonicalCompact { offset: 0 })
        );
    }

    #[test]
    fn test_reject_non_canonical_big() {
        // 1 encoded in big-integer mode with four bytes
        let mut reader = ByteReader::new(&[0x03, 0x01, 0x00, 0x00, 0x00]);
        assert!(matches!(
            reader.read_compact(),
            Err(CodecError::NonCanonicalCompact { .. })
        ));
    }

    #[test]
    fn test_truncated_compact() {
        let mut reader = ByteReader::new(&[0x02, 0x00]);
        assert!(matches!(
            reader.read_compact(),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_split_tail() {
        let data = [1u8, 2, 3, 4, 5];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.split_tail(2).unwrap(), &[4, 5]);
        assert_eq!(reader.remaining(), 3);
        assert!(reader.split_tail(4).is_err());
    }

    #[test]
    fn test_string() {
        let mut out = Vec::new();
        encode_str("polkadot", &mut out);
        let mut reader = ByteReader::new(&out);
        assert_eq!(reader.read_string().unwrap(), "polkadot");
        assert!(reader.finish().is_ok());
    }

    proptest! {
        #[test]
        fn prop_compact_decodes_to_encoded_value(value in any::<u128>()) {
            let bytes = compact_bytes(value);
            let mut reader = ByteReader::new(&bytes);
            prop_assert_eq!(reader.read_compact().unwrap(), value);
            prop_assert!(reader.is_empty());
        }
    }
}
