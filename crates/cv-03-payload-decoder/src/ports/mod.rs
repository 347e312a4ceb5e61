//! # Ports Layer
//!
//! - `inbound` - the decoding API this subsystem offers
//! - `outbound` - the metadata lookup it needs from the host

pub mod inbound;
pub mod outbound;
