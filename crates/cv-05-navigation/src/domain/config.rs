//! # Navigation Configuration

use serde::{Deserialize, Serialize};

/// Navigation limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Consecutive failed signing attempts before the flow is discarded.
    pub max_sign_attempts: u8,
    /// Newest history entries listed on the log screen.
    pub log_entries_shown: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            max_sign_attempts: 3,
            log_entries_shown: 128,
        }
    }
}
