//! # Transport Configuration

use serde::{Deserialize, Serialize};

/// Limits for scanning and display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Seconds a session may stay open before `gc_expired` drops it (default: 120).
    pub session_timeout_secs: u64,

    /// Open sessions kept at once; the oldest is evicted beyond this (default: 8).
    pub max_sessions: usize,

    /// Largest payload a session will collect, in bytes (default: 4 MiB).
    pub max_payload_len: usize,

    /// Fragment bytes per outbound frame (default: 1024).
    pub frame_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            session_timeout_secs: 120,
            max_sessions: 8,
            max_payload_len: 4 * 1024 * 1024,
            frame_capacity: 1024,
        }
    }
}
