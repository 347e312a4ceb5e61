//! # Inbound Ports (Driving Ports / API)
//!
//! The capture loop drives `submit`; the control loop drives `start_session`,
//! `cancel` and the outbound `display_frames`.

use crate::domain::errors::TransportError;
use crate::domain::frame::FrameCycle;
use crate::domain::session::SessionState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of submitting one raw frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitOutcome {
    /// New fragment stored.
    Stored {
        /// Distinct indices held.
        received: u32,
        /// Frames expected.
        count: u32,
    },
    /// Frame already held; nothing changed.
    Duplicate,
    /// This frame completed the payload, which was published.
    Complete {
        /// Payload length in bytes.
        payload_len: usize,
    },
    /// The session completed earlier; the frame was ignored.
    AlreadyComplete,
}

/// Primary QR Transport API.
#[async_trait]
pub trait QrTransportApi: Send + Sync {
    /// Open a new scan session.
    fn start_session(&self) -> Uuid;

    /// Feed one raw scanned frame into a session.
    ///
    /// # Errors
    /// - `Malformed` - frame unreadable, session unchanged
    /// - `UnknownSession` - no such session (never started, cancelled, expired)
    /// - `Failed` - this frame or an earlier one failed the session
    async fn submit(
        &self,
        session_id: Uuid,
        raw_frame: &[u8],
    ) -> Result<SubmitOutcome, TransportError>;

    /// Discard a session. Returns `false` if it did not exist.
    async fn cancel(&self, session_id: Uuid) -> bool;

    /// Current state of a session.
    fn session_state(&self, session_id: Uuid) -> Option<SessionState>;

    /// Drop sessions older than the configured timeout; returns their ids.
    /// Sessions that were collecting frames are reported as failed scans.
    async fn gc_expired(&self) -> Vec<Uuid>;

    /// Frames for showing `payload` to another device.
    fn display_frames(&self, payload: &[u8]) -> Result<FrameCycle, TransportError>;
}
