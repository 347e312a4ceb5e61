//! # Vault Events
//!
//! Events carried from the capture loop to the control loop.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every event that can be published on the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultEvent {
    // =========================================================================
    // TRANSPORT
    // =========================================================================
    /// All frames of a scan session arrived and the integrity tag matched.
    /// Published exactly once per session.
    PayloadReassembled {
        /// Session that completed.
        session_id: Uuid,
        /// Reassembled payload bytes.
        payload: Vec<u8>,
    },

    /// A scan session failed and its buffer was discarded.
    ScanFailed {
        /// Session that failed.
        session_id: Uuid,
        /// Human-readable reason.
        reason: String,
    },

    /// A scan session was cancelled by the user.
    ScanCancelled {
        /// Session that was cancelled.
        session_id: Uuid,
    },
}

/// Coarse grouping used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTopic {
    /// Successful reassembly.
    Payload,
    /// Failures and cancellations.
    ScanControl,
}

impl VaultEvent {
    /// Topic of this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            VaultEvent::PayloadReassembled { .. } => EventTopic::Payload,
            VaultEvent::ScanFailed { .. } | VaultEvent::ScanCancelled { .. } => {
                EventTopic::ScanControl
            }
        }
    }

    /// Session the event belongs to.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        match self {
            VaultEvent::PayloadReassembled { session_id, .. }
            | VaultEvent::ScanFailed { session_id, .. }
            | VaultEvent::ScanCancelled { session_id } => *session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics() {
        let id = Uuid::new_v4();
        assert_eq!(
            VaultEvent::PayloadReassembled {
                session_id: id,
                payload: vec![1],
            }
            .topic(),
            EventTopic::Payload
        );
        let cancelled = VaultEvent::ScanCancelled { session_id: id };
        assert_eq!(cancelled.topic(), EventTopic::ScanControl);
        assert_eq!(cancelled.session_id(), id);
    }
}
