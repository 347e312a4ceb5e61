//! # Loop Handlers
//!
//! ```text
//! camera frames ──→ CaptureLoop ──→ QrTransport ──scan events──→ event queue
//!                                                                    │
//! Navigator control task ←── TransactionFetched / ScanFailed ←── ScanEventHandler
//! ```

pub mod capture;
pub mod scan_events;

pub use capture::{CaptureLoop, ReviewGate, DELIVERY_GRACE};
pub use scan_events::ScanEventHandler;
