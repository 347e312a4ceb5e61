//! # Domain Layer
//!
//! Pure registry logic: pinning rules, planning and applying updates.

pub mod entities;
pub mod errors;
pub mod state;
pub mod trust;
