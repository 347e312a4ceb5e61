//! # Signing Configuration

use serde::{Deserialize, Serialize};

/// Derivation limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Most junctions a derivation path may have (default: 32).
    pub max_path_depth: usize,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self { max_path_depth: 32 }
    }
}
