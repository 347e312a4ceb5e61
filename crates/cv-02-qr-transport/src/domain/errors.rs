//! # Domain Errors
//!
//! Error types for the QR Transport subsystem.
//!
//! A `FrameError` means one scanned frame was unreadable; the session it was
//! submitted to is not affected. A `ReassemblyError` ends the session.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A single frame could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The frame ended before a field was complete.
    #[error("Frame truncated at byte {offset}")]
    Truncated {
        /// Offset of the incomplete field.
        offset: usize,
    },

    /// A LEB128 header field is overlong, overflows `u32`, or is not minimal.
    #[error("Malformed varint at byte {offset}")]
    MalformedVarint {
        /// Offset of the first byte of the varint.
        offset: usize,
    },

    /// `frame_count` is zero.
    #[error("Frame count is zero")]
    ZeroCount,

    /// `frame_index >= frame_count`.
    #[error("Frame index {index} out of range for count {count}")]
    IndexOutOfRange {
        /// Declared index.
        index: u32,
        /// Declared count.
        count: u32,
    },

    /// Bytes remain after the integrity tag.
    #[error("{0} trailing bytes after integrity tag")]
    TrailingBytes(usize),
}

/// Why a reassembly session failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ReassemblyError {
    /// A frame disagrees with what the session already holds.
    #[error("Conflicting frame: {0}")]
    Conflict(ConflictKind),

    /// All frames arrived but the payload does not match the integrity tag.
    #[error("Integrity tag mismatch: expected {expected:08x}, computed {computed:08x}")]
    IntegrityMismatch {
        /// Tag carried by the frames.
        expected: u32,
        /// Tag of the reassembled payload.
        computed: u32,
    },

    /// The announced payload exceeds the configured maximum.
    #[error("Payload too large: at least {len} bytes, limit {max}")]
    PayloadTooLarge {
        /// Bytes announced or collected so far.
        len: usize,
        /// Configured limit.
        max: usize,
    },

    /// The session outlived its timeout.
    #[error("Session expired")]
    Expired,
}

/// Kinds of frame conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    /// Declared frame count differs from the session's.
    Count {
        /// Count the session was started with.
        session: u32,
        /// Count in the offending frame.
        frame: u32,
    },
    /// Integrity tag differs from the session's.
    Tag {
        /// Tag the session was started with.
        session: u32,
        /// Tag in the offending frame.
        frame: u32,
    },
    /// Same index, different fragment.
    Fragment {
        /// Index of the offending frame.
        index: u32,
    },
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictKind::Count { session, frame } => {
                write!(f, "frame count {frame}, session expects {session}")
            }
            ConflictKind::Tag { session, frame } => {
                write!(f, "integrity tag {frame:08x}, session expects {session:08x}")
            }
            ConflictKind::Fragment { index } => {
                write!(f, "frame {index} seen with different content")
            }
        }
    }
}

/// Errors returned by the capture API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The raw frame could not be parsed; the session is unchanged.
    #[error("Malformed frame: {0}")]
    Malformed(#[from] FrameError),

    /// No session with this id.
    #[error("Unknown scan session {0}")]
    UnknownSession(Uuid),

    /// The session already failed.
    #[error("Scan session failed: {0}")]
    Failed(ReassemblyError),

    /// The payload does not fit into `u32::MAX` frames.
    #[error("Payload of {len} bytes needs more than u32::MAX frames")]
    TooManyFrames {
        /// Payload length.
        len: usize,
    },
}
