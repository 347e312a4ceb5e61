//! # Ports Layer
//!
//! - `inbound` - derivation and signing API
//! - `outbound` - seed storage the engine reads phrases from

pub mod inbound;
pub mod outbound;
