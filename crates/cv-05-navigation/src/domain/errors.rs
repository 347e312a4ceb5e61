//! # Navigation Errors
//!
//! A rejected transition leaves the state exactly as it was. Failures of the
//! subsystems behind a transition are not errors here: they become alerts.

use thiserror::Error;

/// Reasons a transition is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    /// `details` could not be interpreted for this action.
    #[error("Invalid details for {action}: {reason}")]
    InvalidDetails {
        /// Action name.
        action: &'static str,
        /// What was wrong.
        reason: String,
    },

    /// The action has no meaning on the current screen.
    #[error("{action} is not available on {screen}")]
    NotAvailable {
        /// Action name.
        action: &'static str,
        /// Current screen name.
        screen: &'static str,
    },

    /// An alert must be dismissed first.
    #[error("An alert is pending; dismiss it first")]
    AlertPending,

    /// `ApproveSign` without an open transaction or update.
    #[error("Nothing to approve")]
    NothingToApprove,

    /// The open transaction cannot be signed.
    #[error("Transaction is not signable")]
    NotSignable,

    /// `ApproveSign` on a transaction without the seed phrase.
    #[error("Signing requires the seed phrase")]
    SecretRequired,

    /// Key derivation without a selected network.
    #[error("No network selected")]
    NoNetworkSelected,

    /// Unknown seed name.
    #[error("Unknown seed: {0}")]
    UnknownSeed(String),

    /// Unknown key.
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// Unknown network.
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    /// Unknown history entry.
    #[error("No history entry {0}")]
    UnknownLogEntry(u32),

    /// The navigator task is gone.
    #[error("Navigator is shut down")]
    Closed,
}
