//! # QR Transport (cv-02)
//!
//! The only way data enters or leaves the vault: payloads are split into
//! frames shown as a cycling sequence of codes, and scanned frames are
//! reassembled per scan session.
//!
//! ## Architecture
//!
//! ```text
//! camera ──raw frame──→ CaptureService::submit ──→ [session buffer]
//!                                                      ↓ complete
//!                                  shared-bus ←──PayloadReassembled (once)
//!                                      ↓
//!                                control loop
//!
//! signature ──→ display_frames ──→ FrameCycle ──→ screen (round-robin)
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Idempotent Frames | Re-scanning a held frame changes nothing |
//! | 2 | Conflict Detection | Count, tag or content disagreement fails the session |
//! | 3 | Integrity | A payload completes only if its CRC-32 matches the frames' tag |
//! | 4 | Publish Once | Each completed session is published exactly once |
//! | 5 | Session Timeout | Sessions older than the timeout are purged |
//! | 6 | Bounded Sessions | At most `max_sessions` sessions are held |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Frame codec, frame cycle, reassembly buffer
//! - `ports/` - Port traits (inbound API, outbound clock)
//! - `service.rs` - Capture service implementing the API

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use domain::config::TransportConfig;
pub use domain::errors::{ConflictKind, FrameError, ReassemblyError, TransportError};
pub use domain::frame::{encode, integrity_tag, FrameCycle, QrFrame};
pub use domain::session::{Insertion, ReassemblyBuffer, SessionState, Timestamp};
pub use ports::inbound::{QrTransportApi, SubmitOutcome};
pub use ports::outbound::{SystemTimeSource, TimeSource};
pub use service::CaptureService;
