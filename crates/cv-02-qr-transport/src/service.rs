//! # Capture Service
//!
//! Session-scoped reassembly behind one lock, plus outbound frame encoding.
//!
//! The session map lock is never held across an `.await`: each submit
//! computes its transition under the lock, releases it, then publishes.
//! Because the `Collecting → Complete` transition happens under the lock
//! exactly once, each payload is published exactly once.

use crate::domain::config::TransportConfig;
use crate::domain::errors::{ReassemblyError, TransportError};
use crate::domain::frame::{FrameCycle, QrFrame};
use crate::domain::session::{Insertion, ReassemblyBuffer, SessionState, Timestamp};
use crate::ports::inbound::{QrTransportApi, SubmitOutcome};
use crate::ports::outbound::{SystemTimeSource, TimeSource};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{EventPublisher, VaultEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

enum Phase {
    Idle,
    Collecting(ReassemblyBuffer),
    Complete { payload_len: usize },
    Failed(ReassemblyError),
}

struct Slot {
    started_at: Timestamp,
    seq: u64,
    phase: Phase,
}

impl Slot {
    fn state(&self) -> SessionState {
        match &self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::Collecting(buffer) => SessionState::Collecting {
                received: buffer.received(),
                count: buffer.count(),
            },
            Phase::Complete { payload_len } => SessionState::Complete {
                payload_len: *payload_len,
            },
            Phase::Failed(reason) => SessionState::Failed(reason.clone()),
        }
    }
}

#[derive(Default)]
struct Sessions {
    slots: HashMap<Uuid, Slot>,
    next_seq: u64,
}

/// What a submit did, decided under the lock.
enum Step {
    Reply(SubmitOutcome),
    Completed(Vec<u8>),
    Failed(ReassemblyError),
}

fn settle(buffer: ReassemblyBuffer, insertion: Insertion) -> (Phase, Step) {
    match insertion {
        Insertion::Stored { received, count } => (
            Phase::Collecting(buffer),
            Step::Reply(SubmitOutcome::Stored { received, count }),
        ),
        Insertion::Duplicate => (
            Phase::Collecting(buffer),
            Step::Reply(SubmitOutcome::Duplicate),
        ),
        Insertion::Complete(payload) => (
            Phase::Complete {
                payload_len: payload.len(),
            },
            Step::Completed(payload),
        ),
    }
}

/// The QR Transport capture service.
pub struct CaptureService<P, T = SystemTimeSource>
where
    P: EventPublisher,
    T: TimeSource,
{
    config: TransportConfig,
    sessions: Mutex<Sessions>,
    publisher: Arc<P>,
    time_source: T,
}

impl<P: EventPublisher> CaptureService<P, SystemTimeSource> {
    /// Service stamped with system time.
    pub fn new(config: TransportConfig, publisher: Arc<P>) -> Self {
        Self::with_time_source(config, publisher, SystemTimeSource)
    }
}

impl<P, T> CaptureService<P, T>
where
    P: EventPublisher,
    T: TimeSource,
{
    /// Service with an explicit clock.
    pub fn with_time_source(config: TransportConfig, publisher: Arc<P>, time_source: T) -> Self {
        Self {
            config,
            sessions: Mutex::new(Sessions::default()),
            publisher,
            time_source,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Number of sessions held, terminal ones included.
    pub fn session_count(&self) -> usize {
        self.sessions.lock().slots.len()
    }

    /// Evict the oldest sessions beyond `max_sessions`.
    fn enforce_max_sessions(sessions: &mut Sessions, max: usize) -> Vec<Uuid> {
        if sessions.slots.len() <= max {
            return Vec::new();
        }
        let mut by_age: Vec<(Uuid, u64)> = sessions
            .slots
            .iter()
            .map(|(id, slot)| (*id, slot.seq))
            .collect();
        by_age.sort_by_key(|(_, seq)| *seq);

        let excess = sessions.slots.len() - max;
        let evicted: Vec<Uuid> = by_age.into_iter().take(excess).map(|(id, _)| id).collect();
        for id in &evicted {
            sessions.slots.remove(id);
        }
        evicted
    }

    fn step(&self, session_id: Uuid, frame: QrFrame) -> Result<Step, TransportError> {
        let mut sessions = self.sessions.lock();
        let slot = sessions
            .slots
            .get_mut(&session_id)
            .ok_or(TransportError::UnknownSession(session_id))?;

        let max = self.config.max_payload_len;
        let (next, step) = match std::mem::replace(&mut slot.phase, Phase::Idle) {
            Phase::Complete { payload_len } => (
                Phase::Complete { payload_len },
                Step::Reply(SubmitOutcome::AlreadyComplete),
            ),
            Phase::Failed(reason) => {
                slot.phase = Phase::Failed(reason.clone());
                return Err(TransportError::Failed(reason));
            }
            Phase::Idle => match ReassemblyBuffer::start(frame, max) {
                Ok((buffer, insertion)) => settle(buffer, insertion),
                Err(reason) => (Phase::Failed(reason.clone()), Step::Failed(reason)),
            },
            Phase::Collecting(mut buffer) => match buffer.insert(frame) {
                Ok(insertion) => settle(buffer, insertion),
                Err(reason) => (Phase::Failed(reason.clone()), Step::Failed(reason)),
            },
        };
        slot.phase = next;
        Ok(step)
    }
}

#[async_trait]
impl<P, T> QrTransportApi for CaptureService<P, T>
where
    P: EventPublisher,
    T: TimeSource,
{
    fn start_session(&self) -> Uuid {
        let session_id = Uuid::new_v4();
        let started_at = self.time_source.now();

        let evicted = {
            let mut sessions = self.sessions.lock();
            let seq = sessions.next_seq;
            sessions.next_seq += 1;
            sessions.slots.insert(
                session_id,
                Slot {
                    started_at,
                    seq,
                    phase: Phase::Idle,
                },
            );
            Self::enforce_max_sessions(&mut sessions, self.config.max_sessions)
        };

        for id in evicted {
            warn!(session_id = %id, "Scan session evicted (too many open sessions)");
        }
        debug!(%session_id, "Scan session started");
        session_id
    }

    async fn submit(
        &self,
        session_id: Uuid,
        raw_frame: &[u8],
    ) -> Result<SubmitOutcome, TransportError> {
        let frame = QrFrame::from_bytes(raw_frame).map_err(|e| {
            debug!(%session_id, error = %e, "Malformed frame ignored");
            TransportError::from(e)
        })?;
        let index = frame.index;

        match self.step(session_id, frame)? {
            Step::Reply(outcome) => {
                debug!(%session_id, index, ?outcome, "Frame submitted");
                Ok(outcome)
            }
            Step::Completed(payload) => {
                let payload_len = payload.len();
                info!(%session_id, payload_len, "Payload reassembled");
                self.publisher
                    .publish(VaultEvent::PayloadReassembled {
                        session_id,
                        payload,
                    })
                    .await;
                Ok(SubmitOutcome::Complete { payload_len })
            }
            Step::Failed(reason) => {
                warn!(%session_id, index, error = %reason, "Scan session failed");
                self.publisher
                    .publish(VaultEvent::ScanFailed {
                        session_id,
                        reason: reason.to_string(),
                    })
                    .await;
                Err(TransportError::Failed(reason))
            }
        }
    }

    async fn cancel(&self, session_id: Uuid) -> bool {
        let removed = self.sessions.lock().slots.remove(&session_id);
        let Some(slot) = removed else {
            return false;
        };

        debug!(%session_id, "Scan session cancelled");
        if !slot.state().is_terminal() {
            self.publisher
                .publish(VaultEvent::ScanCancelled { session_id })
                .await;
        }
        true
    }

    fn session_state(&self, session_id: Uuid) -> Option<SessionState> {
        self.sessions.lock().slots.get(&session_id).map(Slot::state)
    }

    async fn gc_expired(&self) -> Vec<Uuid> {
        let now = self.time_source.now();
        let timeout = self.config.session_timeout_secs;

        // Only sessions that had started collecting frames are reported.
        let expired: Vec<(Uuid, bool)> = {
            let mut sessions = self.sessions.lock();
            let ids: Vec<Uuid> = sessions
                .slots
                .iter()
                .filter(|(_, slot)| now.saturating_sub(slot.started_at) > timeout)
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| {
                    sessions
                        .slots
                        .remove(&id)
                        .map(|slot| {
                            let collecting =
                                matches!(slot.state(), SessionState::Collecting { .. });
                            (id, collecting)
                        })
                })
                .collect()
        };

        for (session_id, collecting) in &expired {
            if *collecting {
                warn!(%session_id, "Scan session expired");
                self.publisher
                    .publish(VaultEvent::ScanFailed {
                        session_id: *session_id,
                        reason: ReassemblyError::Expired.to_string(),
                    })
                    .await;
            }
        }
        expired.into_iter().map(|(id, _)| id).collect()
    }

    fn display_frames(&self, payload: &[u8]) -> Result<FrameCycle, TransportError> {
        FrameCycle::from_payload(payload, self.config.frame_capacity)
    }
}
