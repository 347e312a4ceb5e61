//! # Outbound Ports (Driven Ports)
//!
//! Completed payloads leave through `shared_bus::EventPublisher`; the only
//! other dependency is the clock used for session expiry.

use crate::domain::session::Timestamp;
use std::sync::Arc;

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Get current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

// =============================================================================
// ADAPTER IMPLEMENTATIONS
// =============================================================================

/// Default time source using system time.
#[derive(Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
