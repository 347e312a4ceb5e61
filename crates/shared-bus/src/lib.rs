//! # Shared Bus - Capture to Control Event Queue
//!
//! The capture loop and the control loop never share state directly. The
//! capture side publishes completed reassemblies here; the single control
//! task drains them in order.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Capture loop │                    │ Control loop │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │ Event Queue  │          │
//!                  │  (mpsc)      │ ─────────┘
//!                  └──────────────┘  take_receiver()
//! ```
//!
//! ## Rules
//!
//! - Exactly one receiver exists; a second `take_receiver` returns `None`.
//! - Events are delivered in publication order.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventTopic, VaultEvent};
pub use publisher::{EventPublisher, InMemoryEventQueue};
pub use subscriber::{EventReceiver, SubscriptionError};

/// Maximum events to buffer before publishers wait.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;
