//! # Ports Layer
//!
//! - `inbound` - the action surface offered to the screen layer
//! - `outbound` - history log and outbound frame encoding

pub mod inbound;
pub mod outbound;
