//! # Frame Codec
//!
//! One optical frame carries one fragment of a payload:
//!
//! ```text
//! [frame_index: LEB128][frame_count: LEB128][fragment_len: LEB128][fragment][tag: u32 BE]
//! ```
//!
//! The tag is the CRC-32 of the whole payload, repeated in every frame, so a
//! reader can tell frames of different payloads apart before it has all of
//! them.

use super::errors::{FrameError, TransportError};
use serde::{Deserialize, Serialize};

/// Longest LEB128 encoding of a `u32`.
const MAX_VARINT_LEN: usize = 5;

/// CRC-32 of a payload, as carried in every frame.
pub fn integrity_tag(payload: &[u8]) -> u32 {
    crc32fast::hash(payload)
}

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrFrame {
    /// Position of this fragment, `0..count`.
    pub index: u32,
    /// Total number of frames of the payload.
    pub count: u32,
    /// Fragment bytes.
    pub fragment: Vec<u8>,
    /// CRC-32 of the whole payload.
    pub tag: u32,
}

impl QrFrame {
    /// Wire encoding of this frame.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.fragment.len() + 3 * MAX_VARINT_LEN + 4);
        write_varint(self.index, &mut out);
        write_varint(self.count, &mut out);
        write_varint(self.fragment.len() as u32, &mut out);
        out.extend_from_slice(&self.fragment);
        out.extend_from_slice(&self.tag.to_be_bytes());
        out
    }

    /// Parse one raw frame.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, FrameError> {
        let mut offset = 0;
        let index = read_varint(raw, &mut offset)?;
        let count = read_varint(raw, &mut offset)?;
        let fragment_len = read_varint(raw, &mut offset)? as usize;

        if count == 0 {
            return Err(FrameError::ZeroCount);
        }
        if index >= count {
            return Err(FrameError::IndexOutOfRange { index, count });
        }

        let fragment_end = offset
            .checked_add(fragment_len)
            .ok_or(FrameError::Truncated { offset })?;
        let tag_end = fragment_end + 4;
        if raw.len() < tag_end {
            return Err(FrameError::Truncated {
                offset: raw.len().min(fragment_end),
            });
        }
        if raw.len() > tag_end {
            return Err(FrameError::TrailingBytes(raw.len() - tag_end));
        }

        let fragment = raw[offset..fragment_end].to_vec();
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&raw[fragment_end..tag_end]);

        Ok(Self {
            index,
            count,
            fragment,
            tag: u32::from_be_bytes(tag),
        })
    }
}

/// Split `payload` into frames of at most `capacity` fragment bytes.
///
/// A `capacity` of zero is treated as one. An empty payload still yields one
/// (empty) frame so the receiver can complete.
pub fn encode(payload: &[u8], capacity: usize) -> Result<Vec<QrFrame>, TransportError> {
    let capacity = capacity.max(1);
    let tag = integrity_tag(payload);

    let chunks: Vec<&[u8]> = if payload.is_empty() {
        vec![&[]]
    } else {
        payload.chunks(capacity).collect()
    };
    let count = u32::try_from(chunks.len())
        .map_err(|_| TransportError::TooManyFrames { len: payload.len() })?;

    Ok(chunks
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| QrFrame {
            index: index as u32,
            count,
            fragment: chunk.to_vec(),
            tag,
        })
        .collect())
}

/// Endless round-robin over the encoded frames of one payload.
///
/// The display loop pulls from it until the user dismisses the code.
#[derive(Debug, Clone)]
pub struct FrameCycle {
    frames: Vec<Vec<u8>>,
    next: usize,
}

impl FrameCycle {
    /// Cycle over `frames`.
    pub fn new(frames: &[QrFrame]) -> Self {
        Self {
            frames: frames.iter().map(QrFrame::to_bytes).collect(),
            next: 0,
        }
    }

    /// Encode `payload` and cycle over the result.
    pub fn from_payload(payload: &[u8], capacity: usize) -> Result<Self, TransportError> {
        Ok(Self::new(&encode(payload, capacity)?))
    }

    /// Number of distinct frames in one cycle.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Iterator for FrameCycle {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.frames.get(self.next)?.clone();
        self.next = (self.next + 1) % self.frames.len();
        Some(frame)
    }
}

fn write_varint(mut value: u32, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn read_varint(raw: &[u8], offset: &mut usize) -> Result<u32, FrameError> {
    let start = *offset;
    let mut value: u32 = 0;

    for i in 0..MAX_VARINT_LEN {
        let byte = *raw
            .get(start + i)
            .ok_or(FrameError::Truncated { offset: start + i })?;
        let bits = u32::from(byte & 0x7f);

        // The fifth byte only has room for the top 4 bits.
        if i == MAX_VARINT_LEN - 1 && bits > 0x0f {
            return Err(FrameError::MalformedVarint { offset: start });
        }
        value |= bits << (7 * i);

        if byte & 0x80 == 0 {
            // A zero final byte after a continuation is an overlong encoding.
            if i > 0 && byte == 0 {
                return Err(FrameError::MalformedVarint { offset: start });
            }
            *offset = start + i + 1;
            return Ok(value);
        }
    }
    Err(FrameError::MalformedVarint { offset: start })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_frame_layout() {
        let frame = QrFrame {
            index: 1,
            count: 3,
            fragment: b"BB".to_vec(),
            tag: 0x0102_0304,
        };
        assert_eq!(
            frame.to_bytes(),
            vec![0x01, 0x03, 0x02, b'B', b'B', 0x01, 0x02, 0x03, 0x04]
        );
    }

    #[test]
    fn test_multi_byte_varint() {
        let frame = QrFrame {
            index: 200,
            count: 300,
            fragment: vec![],
            tag: 0,
        };
        let bytes = frame.to_bytes();
        assert_eq!(&bytes[..4], &[0xc8, 0x01, 0xac, 0x02]);
        assert_eq!(QrFrame::from_bytes(&bytes).unwrap(), frame);
    }

    #[test]
    fn test_rejects_zero_count() {
        assert_eq!(
            QrFrame::from_bytes(&[0, 0, 0, 0, 0, 0, 0]),
            Err(FrameError::ZeroCount)
        );
    }

    #[test]
    fn test_rejects_index_past_count() {
        assert_eq!(
            QrFrame::from_bytes(&[2, 2, 0, 0, 0, 0, 0]),
            Err(FrameError::IndexOutOfRange { index: 2, count: 2 })
        );
    }

    #[test]
    fn test_rejects_truncated_and_trailing() {
        let bytes = QrFrame {
            index: 0,
            count: 1,
            fragment: b"abc".to_vec(),
            tag: 7,
        }
        .to_bytes();

        assert!(matches!(
            QrFrame::from_bytes(&bytes[..bytes.len() - 1]),
            Err(FrameError::Truncated { .. })
        ));

        let mut extended = bytes.clone();
        extended.push(0);
        assert_eq!(
            QrFrame::from_bytes(&extended),
            Err(FrameError::TrailingBytes(1))
        );
    }

    #[test]
    fn test_rejects_overlong_varint() {
        // 0x80 0x00 encodes zero in two bytes.
        assert_eq!(
            QrFrame::from_bytes(&[0x80, 0x00, 1, 0, 0, 0, 0, 0]),
            Err(FrameError::MalformedVarint { offset: 0 })
        );
        assert_eq!(
            QrFrame::from_bytes(&[0xff, 0xff, 0xff, 0xff, 0x1f]),
            Err(FrameError::MalformedVarint { offset: 0 })
        );
    }

    #[test]
    fn test_encode_splits_and_tags() {
        let frames = encode(b"AABBCC", 2).unwrap();
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|f| f.count == 3));
        assert!(frames.iter().all(|f| f.tag == integrity_tag(b"AABBCC")));
        assert_eq!(frames[2].fragment, b"CC");
    }

    #[test]
    fn test_encode_empty_payload() {
        let frames = encode(&[], 16).unwrap();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].fragment.is_empty());
    }

    #[test]
    fn test_cycle_round_robin() {
        let mut cycle = FrameCycle::from_payload(b"xyz", 1).unwrap();
        assert_eq!(cycle.len(), 3);
        let first: Vec<_> = cycle.by_ref().take(3).collect();
        let second: Vec<_> = cycle.take(3).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cycle_over_nothing_ends() {
        assert_eq!(FrameCycle::new(&[]).next(), None);
    }

    proptest! {
        #[test]
        fn prop_frames_parse_back(
            payload in proptest::collection::vec(any::<u8>(), 0..512),
            capacity in 1usize..64,
        ) {
            let frames = encode(&payload, capacity).unwrap();
            let mut joined = Vec::new();
            for frame in &frames {
                let parsed = QrFrame::from_bytes(&frame.to_bytes()).unwrap();
                prop_assert_eq!(&parsed, frame);
                joined.extend_from_slice(&parsed.fragment);
            }
            prop_assert_eq!(joined, payload);
        }
    }
}
