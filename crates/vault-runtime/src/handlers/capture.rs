//! # Capture Loop
//!
//! Feeds raw camera frames into one scan session at a time. A fresh session
//! is opened whenever the current one completes, fails or disappears, so the
//! camera can keep running across payloads.
//!
//! Frames of a payload that was just reassembled are held back while the
//! camera still sees its code: for a short grace window after delivery, and
//! for as long as the review gate reports the payload open. Once the review
//! closes the same code scans again.

use cv_02_qr_transport::{QrFrame, QrTransportApi, SubmitOutcome, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// How long frames of a delivered payload are skipped before the review
/// has had a chance to open.
pub const DELIVERY_GRACE: Duration = Duration::from_secs(2);

/// Reports whether a delivered payload is still under review.
pub type ReviewGate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Frames of the last delivered payload being held back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hold {
    Delivered { tag: u32, at: Instant },
    Reviewing { tag: u32 },
}

impl Hold {
    fn tag(&self) -> u32 {
        match self {
            Hold::Delivered { tag, .. } | Hold::Reviewing { tag } => *tag,
        }
    }
}

/// Drives a transport from a stream of raw frames.
pub struct CaptureLoop<T: QrTransportApi + ?Sized> {
    transport: Arc<T>,
    frames: mpsc::Receiver<Vec<u8>>,
    gc_interval: Duration,
    review_open: ReviewGate,
    hold: Option<Hold>,
}

impl<T: QrTransportApi + ?Sized> CaptureLoop<T> {
    /// Loop reading `frames`; expired sessions are collected every `gc_interval`.
    pub fn new(
        transport: Arc<T>,
        frames: mpsc::Receiver<Vec<u8>>,
        gc_interval: Duration,
    ) -> Self {
        Self {
            transport,
            frames,
            gc_interval,
            review_open: Arc::new(|| false),
            hold: None,
        }
    }

    /// Keep skipping a delivered payload while `gate` returns true.
    pub fn with_review_gate(mut self, gate: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.review_open = Arc::new(gate);
        self
    }

    /// Run until the frame channel closes.
    pub async fn run(mut self) {
        let mut session = self.transport.start_session();
        info!(session = %session, "Capture loop started");

        let mut gc = tokio::time::interval(self.gc_interval);
        gc.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                frame = self.frames.recv() => {
                    let Some(frame) = frame else { break };
                    let tag = QrFrame::from_bytes(&frame).ok().map(|parsed| parsed.tag);
                    if tag.is_some_and(|tag| self.held(tag)) {
                        continue;
                    }
                    let (next, complete) = self.feed(session, &frame).await;
                    if let (true, Some(tag)) = (complete, tag) {
                        self.hold = Some(Hold::Delivered { tag, at: Instant::now() });
                    }
                    session = next;
                }
                _ = gc.tick() => {
                    let expired = self.transport.gc_expired().await;
                    if !expired.is_empty() {
                        debug!(count = expired.len(), "Expired scan sessions dropped");
                    }
                }
            }
        }

        self.transport.cancel(session).await;
        info!("Capture loop stopped");
    }

    /// Whether a frame tagged `tag` belongs to a payload still held back.
    fn held(&mut self, tag: u32) -> bool {
        let Some(hold) = self.hold else {
            return false;
        };
        let reviewing = (self.review_open)();
        self.hold = match hold {
            Hold::Delivered { tag, .. } if reviewing => Some(Hold::Reviewing { tag }),
            Hold::Delivered { at, .. } if at.elapsed() >= DELIVERY_GRACE => None,
            Hold::Delivered { .. } => Some(hold),
            Hold::Reviewing { .. } if reviewing => Some(hold),
            Hold::Reviewing { tag } => {
                debug!(tag, "Review closed, payload may be scanned again");
                None
            }
        };
        self.hold.is_some_and(|hold| hold.tag() == tag)
    }

    /// Submit one frame; returns the session the next frame goes to and
    /// whether this frame completed a payload.
    async fn feed(&self, mut session: Uuid, frame: &[u8]) -> (Uuid, bool) {
        // A frame that ends a session is retried once on a fresh one.
        for _ in 0..2 {
            match self.transport.submit(session, frame).await {
                Ok(SubmitOutcome::Stored { received, count }) => {
                    debug!(session = %session, received, count, "Frame stored");
                    return (session, false);
                }
                Ok(SubmitOutcome::Duplicate) => return (session, false),
                Ok(SubmitOutcome::Complete { payload_len }) => {
                    info!(session = %session, payload_len, "Scan complete");
                    return (self.transport.start_session(), true);
                }
                Ok(SubmitOutcome::AlreadyComplete) => {
                    return (self.transport.start_session(), false);
                }
                Err(TransportError::Malformed(e)) => {
                    debug!(session = %session, error = %e, "Unreadable frame ignored");
                    return (session, false);
                }
                Err(TransportError::UnknownSession(_)) => {
                    debug!(session = %session, "Scan session expired, starting over");
                    session = self.transport.start_session();
                }
                Err(e) => {
                    warn!(session = %session, error = %e, "Scan session failed, starting over");
                    session = self.transport.start_session();
                }
            }
        }
        (session, false)
    }
}
