//! # Adapters
//!
//! - `channel` - mpsc/oneshot front end serializing actions on one task

pub mod channel;
