//! # Domain Layer
//!
//! Path grammar, derivation steps and the public-only key ring.

pub mod config;
pub mod derivation;
pub mod entities;
pub mod errors;
pub mod path;
