//! # Reassembly Sessions
//!
//! A scan session collects frames until every index `0..count` is present.
//! Frames may arrive in any order and any number of times.
//!
//! ```text
//! Idle ──first frame──→ Collecting ──all indices + tag ok──→ Complete
//!                           │
//!                           └──conflict / tag mismatch / too large──→ Failed
//! ```

use super::errors::{ConflictKind, ReassemblyError};
use super::frame::{integrity_tag, QrFrame};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// Externally visible state of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Started, no frame yet.
    Idle,
    /// Some frames collected.
    Collecting {
        /// Distinct indices held.
        received: u32,
        /// Frames expected.
        count: u32,
    },
    /// Payload reassembled and handed off.
    Complete {
        /// Payload length in bytes.
        payload_len: usize,
    },
    /// Session failed; its buffer was discarded.
    Failed(ReassemblyError),
}

impl SessionState {
    /// Whether no further frames are accepted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Complete { .. } | SessionState::Failed(_))
    }
}

/// What one accepted frame did to the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// New index stored; more frames needed.
    Stored {
        /// Distinct indices held.
        received: u32,
        /// Frames expected.
        count: u32,
    },
    /// Same index and content as before; nothing changed.
    Duplicate,
    /// Last missing index stored and the tag matched.
    Complete(Vec<u8>),
}

/// Fragments of one payload, keyed by frame index.
#[derive(Debug, Clone)]
pub struct ReassemblyBuffer {
    count: u32,
    tag: u32,
    fragments: BTreeMap<u32, Vec<u8>>,
    collected_bytes: usize,
    max_payload_len: usize,
}

impl ReassemblyBuffer {
    /// Start a buffer from the first frame of a session.
    pub fn start(
        first: QrFrame,
        max_payload_len: usize,
    ) -> Result<(Self, Insertion), ReassemblyError> {
        let mut buffer = Self {
            count: first.count,
            tag: first.tag,
            fragments: BTreeMap::new(),
            collected_bytes: 0,
            max_payload_len,
        };
        let insertion = buffer.insert(first)?;
        Ok((buffer, insertion))
    }

    /// Add a frame.
    ///
    /// Any error means the session must be failed; the buffer is not
    /// usable afterwards.
    pub fn insert(&mut self, frame: QrFrame) -> Result<Insertion, ReassemblyError> {
        if frame.count != self.count {
            return Err(ReassemblyError::Conflict(ConflictKind::Count {
                session: self.count,
                frame: frame.count,
            }));
        }
        if frame.tag != self.tag {
            return Err(ReassemblyError::Conflict(ConflictKind::Tag {
                session: self.tag,
                frame: frame.tag,
            }));
        }
        if let Some(existing) = self.fragments.get(&frame.index) {
            return if *existing == frame.fragment {
                Ok(Insertion::Duplicate)
            } else {
                Err(ReassemblyError::Conflict(ConflictKind::Fragment {
                    index: frame.index,
                }))
            };
        }

        self.collected_bytes += frame.fragment.len();
        if self.collected_bytes > self.max_payload_len {
            return Err(ReassemblyError::PayloadTooLarge {
                len: self.collected_bytes,
                max: self.max_payload_len,
            });
        }
        self.fragments.insert(frame.index, frame.fragment);

        if self.received() < self.count {
            return Ok(Insertion::Stored {
                received: self.received(),
                count: self.count,
            });
        }

        let payload: Vec<u8> = self.fragments.values().flatten().copied().collect();
        let computed = integrity_tag(&payload);
        if computed != self.tag {
            return Err(ReassemblyError::IntegrityMismatch {
                expected: self.tag,
                computed,
            });
        }
        Ok(Insertion::Complete(payload))
    }

    /// Distinct indices held.
    pub fn received(&self) -> u32 {
        self.fragments.len() as u32
    }

    /// Frames expected.
    pub fn count(&self) -> u32 {
        self.count
    }
}
