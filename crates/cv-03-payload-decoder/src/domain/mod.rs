//! # Domain Layer
//!
//! Pure decoding: envelope, extensions, call trees, balances, eras.

pub mod balance;
pub mod call;
pub mod cards;
pub mod config;
pub mod envelope;
pub mod era;
pub mod errors;
pub mod payload;
pub mod update;
