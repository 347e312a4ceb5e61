//! # Actions
//!
//! Everything the user can do. The argument of an action travels in the
//! free-form `details` string next to it:
//!
//! | Action | `details` |
//! |--------|-----------|
//! | `Navigate` | screen name (`log`, `scan`, `seeds`, `settings`, `networks`) |
//! | `SelectTab` | tab name (`log`, `scan`, `keys`, `settings`) |
//! | `SelectSeed` | seed name |
//! | `SelectKey` | public key hex |
//! | `SelectNetwork` | genesis hash hex |
//! | `DeriveKey` | derivation path |
//! | `TransactionFetched`, `LoadMetadata`, `AddNetworkSpec` | payload hex |
//! | `ApproveSign` | path password, empty if none |
//! | `ShowLogDetails` | history entry order |
//! | `RemoveNetwork` | unused, acts on the open network |
//! | `RemoveMetadata` | spec version |
//! | `ScanFailed` | failure reason |

use serde::{Deserialize, Serialize};
use std::fmt;

/// User action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Reset to the home screen.
    Start,
    /// Open a screen on top of the current one.
    Navigate,
    /// Dismiss the alert, else the modal, else the top screen.
    GoBack,
    /// Switch tab, dropping the stack.
    SelectTab,
    /// Open the keys of a seed.
    SelectSeed,
    /// Open a key.
    SelectKey,
    /// Pick a network.
    SelectNetwork,
    /// Derive a key on the selected seed and network.
    DeriveKey,
    /// A scanned payload arrived.
    TransactionFetched,
    /// A scanned metadata update arrived.
    LoadMetadata,
    /// A scanned network specs update arrived.
    AddNetworkSpec,
    /// Approve the open transaction or update.
    ApproveSign,
    /// Abandon the open flow.
    Cancel,
    /// Context button of the current screen.
    RightButton,
    /// Open a history entry.
    ShowLogDetails,
    /// Remove the open network with all its metadata.
    RemoveNetwork,
    /// Remove one metadata version of the open network.
    RemoveMetadata,
    /// The camera gave up on a multi-frame code.
    ScanFailed,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Action; 18] = [
        Action::Start,
        Action::Navigate,
        Action::GoBack,
        Action::SelectTab,
        Action::SelectSeed,
        Action::SelectKey,
        Action::SelectNetwork,
        Action::DeriveKey,
        Action::TransactionFetched,
        Action::LoadMetadata,
        Action::AddNetworkSpec,
        Action::ApproveSign,
        Action::Cancel,
        Action::RightButton,
        Action::ShowLogDetails,
        Action::RemoveNetwork,
        Action::RemoveMetadata,
        Action::ScanFailed,
    ];

    /// Parse a snake_case action name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.name() == name)
    }

    /// Name used in errors and logs.
    pub fn name(self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Navigate => "navigate",
            Action::GoBack => "go_back",
            Action::SelectTab => "select_tab",
            Action::SelectSeed => "select_seed",
            Action::SelectKey => "select_key",
            Action::SelectNetwork => "select_network",
            Action::DeriveKey => "derive_key",
            Action::TransactionFetched => "transaction_fetched",
            Action::LoadMetadata => "load_metadata",
            Action::AddNetworkSpec => "add_network_spec",
            Action::ApproveSign => "approve_sign",
            Action::Cancel => "cancel",
            Action::RightButton => "right_button",
            Action::ShowLogDetails => "show_log_details",
            Action::RemoveNetwork => "remove_network",
            Action::RemoveMetadata => "remove_metadata",
            Action::ScanFailed => "scan_failed",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Footer tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    /// History log.
    Log,
    /// Camera.
    Scan,
    /// Seeds and keys.
    Keys,
    /// Settings.
    Settings,
}

impl Tab {
    /// Parse a tab name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "log" => Some(Tab::Log),
            "scan" => Some(Tab::Scan),
            "keys" => Some(Tab::Keys),
            "settings" => Some(Tab::Settings),
            _ => None,
        }
    }
}
