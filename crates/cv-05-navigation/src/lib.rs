//! # Navigation State Machine (cv-05)
//!
//! Sequences the vault's screens from user actions and drives the other
//! subsystems through review and consent.
//!
//! ## Signing Flow
//!
//! ```text
//! TransactionFetched ──→ decode ──→ Transaction screen (SigningPending)
//!                                        │
//!                     ApproveSign + seed phrase
//!                         │                      │
//!                      signed                 failed ──→ SignFailed alert (retry)
//!                         │                      │
//!              SignatureReady modal       max attempts ──→ home + alert
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Pure Transitions | `apply` never mutates its input state |
//! | 2 | Serialized | One transition at a time per navigator |
//! | 3 | No Null Screen | Every result carries concrete screen data |
//! | 4 | No Stored Secrets | Seed phrases never enter the state |
//! | 5 | Context Cleared | Leaving or covering the review screen discards the pending signature |
//! | 6 | Blocking Trust Alerts | Trust violations dismiss only to the home screen |
//! | 7 | Rescan Allowed | A scan failure alert gives way to the next scanned payload |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - State, actions, render instructions, errors
//! - `ports/` - Port traits (inbound API, outbound history and frames)
//! - `transition.rs` - Transition function and rendering
//! - `service.rs` - Lock-serialized navigator
//! - `adapters/` - Channel front end for the control task

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod transition;

// Re-export key types for convenience
pub use adapters::channel::NavigatorHandle;
pub use domain::action::{Action, Tab};
pub use domain::config::NavigationConfig;
pub use domain::errors::NavigationError;
pub use domain::result::{
    ActionResult, AlertData, LogLine, ModalData, NetworkSummary, RightButton, ScreenData,
    ScreenNameType,
};
pub use domain::state::{Alert, Modal, NavState, Screen, SecurityContext, TransactionKind};
pub use ports::inbound::NavigationApi;
pub use ports::outbound::{FrameEncoder, HistoryStore, QrFrameEncoder};
pub use service::{Navigator, NavigatorDeps};
pub use transition::{apply, render, NavContext};
