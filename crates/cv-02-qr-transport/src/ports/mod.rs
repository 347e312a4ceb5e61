//! # Ports Layer
//!
//! - `inbound` - the capture API this subsystem offers
//! - `outbound` - what it needs from the host

pub mod inbound;
pub mod outbound;
