//! # Render Instructions
//!
//! `ActionResult` is everything the screen layer needs after a transition.
//! All variants are closed; every result carries concrete screen data.

use super::action::Tab;
use cv_03_payload_decoder::Card;
use cv_04_signature_engine::KeyHandle;
use serde::{Deserialize, Serialize};
use shared_types::{Encryption, HistoryEntry, NetworkSpecs, Verifier};

/// Header style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenNameType {
    /// Large title on tab roots.
    H1,
    /// Small title on nested screens.
    H4,
}

/// Context button in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RightButton {
    /// Opens the network picker.
    NetworkSelector,
}

/// One line of the history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// Entry order.
    pub order: u32,
    /// Unix seconds.
    pub timestamp: u64,
    /// Event label.
    pub label: String,
}

impl From<&HistoryEntry> for LogLine {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            order: entry.order,
            timestamp: entry.timestamp,
            label: entry.event.label().to_string(),
        }
    }
}

/// Short network description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSummary {
    /// Genesis hash hex.
    pub genesis_hash: String,
    /// Network name.
    pub name: String,
    /// Display title.
    pub title: String,
    /// Signature scheme.
    pub encryption: Encryption,
    /// Whether this is the network chosen for derivation.
    pub selected: bool,
}

impl NetworkSummary {
    /// Summary of `specs`.
    pub fn new(specs: &NetworkSpecs, selected: bool) -> Self {
        Self {
            genesis_hash: specs.genesis_hex(),
            name: specs.name.clone(),
            title: specs.title.clone(),
            encryption: specs.encryption,
            selected,
        }
    }
}

/// Content of the current screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum ScreenData {
    /// History, newest first.
    Log {
        /// Entries.
        entries: Vec<LogLine>,
    },
    /// One history entry.
    LogDetails {
        /// The entry.
        entry: Option<HistoryEntry>,
    },
    /// Camera.
    Scan,
    /// Seeds.
    SeedSelector {
        /// Seed names.
        seeds: Vec<String>,
    },
    /// Keys of a seed.
    Keys {
        /// Seed name.
        seed_name: String,
        /// Selected network.
        network: Option<NetworkSummary>,
        /// Derived keys.
        keys: Vec<KeyHandle>,
    },
    /// One key.
    KeyDetails {
        /// The key.
        key: KeyHandle,
    },
    /// Settings.
    Settings {
        /// Number of known networks.
        networks: usize,
    },
    /// Known networks.
    ManageNetworks {
        /// Networks.
        networks: Vec<NetworkSummary>,
    },
    /// One network.
    NetworkDetails {
        /// Specs.
        specs: Option<NetworkSpecs>,
        /// Verifier pin.
        verifier: Option<Verifier>,
        /// Stored metadata versions.
        versions: Vec<u32>,
    },
    /// Review of a scanned payload.
    Transaction {
        /// `transaction`, `message` or `update`.
        kind: String,
        /// Cards in display order.
        cards: Vec<Card>,
        /// Key that would sign.
        author: Option<KeyHandle>,
        /// Whether `ApproveSign` is offered.
        approvable: bool,
    },
}

/// Content of the open modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "modal", rename_all = "snake_case")]
pub enum ModalData {
    /// Signature ready to be scanned back.
    SignatureReady {
        /// Scheme-tagged signature hex.
        signature: String,
        /// Outbound frames, hex, shown in a cycle.
        frames: Vec<String>,
    },
    /// Network picker.
    NetworkSelector {
        /// Networks.
        networks: Vec<NetworkSummary>,
    },
}

/// Content of the open alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "alert", rename_all = "snake_case")]
pub enum AlertData {
    /// Recoverable error.
    Error {
        /// Message.
        message: String,
    },
    /// Code not read completely; scan again.
    ScanFailed {
        /// Message.
        message: String,
    },
    /// Verifier rules broken.
    TrustViolation {
        /// Message.
        message: String,
    },
    /// Signing attempt failed.
    SignFailed {
        /// Message.
        message: String,
        /// Attempts before the flow is discarded.
        attempts_left: u8,
    },
}

/// Render instruction returned by every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Header title.
    pub screen_label: String,
    /// Whether a back button is shown.
    pub back: bool,
    /// Whether the footer is shown.
    pub footer: bool,
    /// Highlighted footer tab.
    pub footer_button: Option<Tab>,
    /// Header context button.
    pub right_button: Option<RightButton>,
    /// Header style.
    pub screen_name_type: ScreenNameType,
    /// Screen content.
    pub screen_data: ScreenData,
    /// Modal content.
    pub modal_data: Option<ModalData>,
    /// Alert content.
    pub alert_data: Option<AlertData>,
}
