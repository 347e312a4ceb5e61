//! # Domain Layer
//!
//! Frame codec, frame cycling and the reassembly buffer. No I/O, no locks.

pub mod config;
pub mod errors;
pub mod frame;
pub mod session;
