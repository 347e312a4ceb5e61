//! # Cold Vault Test Suite
//!
//! Cross-subsystem scenarios run against the same `VaultContext` the
//! runtime builds.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs      # Networks, metadata, payload builders
//!     ├── scan_flow.rs     # Frames → reassembly → review → signature frames
//!     ├── trust_flow.rs    # Update previews and verifier pinning
//!     ├── decode_flow.rs   # Card trees for nested and unknown calls
//!     └── signing_flow.rs  # Secret lifetime and derivation
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cv-tests
//! cargo test -p cv-tests integration::trust_flow
//! ```

#![allow(dead_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod integration;
