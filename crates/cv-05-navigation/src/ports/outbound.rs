//! # Outbound Ports (Driven Ports)
//!
//! History storage and outbound frame encoding. Registry, decoder and signer
//! are reached through their own inbound APIs.

use cv_01_metadata_registry::{HistoryLog, InMemoryHistoryLog, TimeSource};
use cv_02_qr_transport::{encode, QrFrame, TransportError};
use shared_types::{HistoryEntry, HistoryEvent};

/// Append-only history log with read access for the log screens.
pub trait HistoryStore: Send + Sync {
    /// Append an event.
    fn append(&self, event: HistoryEvent);

    /// All entries, oldest first.
    fn entries(&self) -> Vec<HistoryEntry>;

    /// Entry by order.
    fn entry(&self, order: u32) -> Option<HistoryEntry>;
}

/// Turns bytes into frames for display.
pub trait FrameEncoder: Send + Sync {
    /// Encoded frames, in index order.
    fn encode_frames(&self, payload: &[u8]) -> Result<Vec<Vec<u8>>, TransportError>;
}

// =============================================================================
// ADAPTER IMPLEMENTATIONS
// =============================================================================

impl<T: TimeSource> HistoryStore for InMemoryHistoryLog<T> {
    fn append(&self, event: HistoryEvent) {
        HistoryLog::append(self, event);
    }

    fn entries(&self) -> Vec<HistoryEntry> {
        InMemoryHistoryLog::entries(self)
    }

    fn entry(&self, order: u32) -> Option<HistoryEntry> {
        InMemoryHistoryLog::entry(self, order)
    }
}

/// Frame encoder backed by the transport frame codec.
#[derive(Debug, Clone, Copy)]
pub struct QrFrameEncoder {
    capacity: usize,
}

impl QrFrameEncoder {
    /// Encoder producing fragments of at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }
}

impl FrameEncoder for QrFrameEncoder {
    fn encode_frames(&self, payload: &[u8]) -> Result<Vec<Vec<u8>>, TransportError> {
        Ok(encode(payload, self.capacity)?.iter().map(QrFrame::to_bytes).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_store_over_in_memory_log() {
        let log = InMemoryHistoryLog::new();
        HistoryStore::append(
            &log,
            HistoryEvent::UpdateRejected {
                genesis_hash: [0; 32],
                reason: "test".into(),
            },
        );
        assert_eq!(HistoryStore::entries(&log).len(), 1);
        assert!(HistoryStore::entry(&log, 0).is_some());
        assert!(HistoryStore::entry(&log, 1).is_none());
    }

    #[test]
    fn test_frame_encoder_splits_payload() {
        let frames = QrFrameEncoder::new(4).encode_frames(&[1; 10]).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(QrFrame::from_bytes(&frames[2]).unwrap().fragment, vec![1, 1]);
    }
}
