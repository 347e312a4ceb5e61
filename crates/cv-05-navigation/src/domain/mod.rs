//! # Domain Layer
//!
//! Navigation state, actions, render instructions and errors. No subsystem
//! calls happen here.

pub mod action;
pub mod config;
pub mod errors;
pub mod result;
pub mod state;
