//! # Adapter Implementations
//!
//! Concrete implementations of subsystem outbound ports that are backed by
//! another subsystem.
//!
//! ```text
//! PayloadDecoder ──MetadataLookup──→ RegistryLookup ──→ MetadataRegistryApi
//! ```

pub mod metadata_lookup;

pub use metadata_lookup::RegistryLookup;
