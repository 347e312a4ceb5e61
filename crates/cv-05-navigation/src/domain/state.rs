//! # Navigation State
//!
//! An explicit screen stack (never empty), at most one modal, at most one
//! alert, and the security context of a pending signature. Secrets are never
//! part of the state.

use super::action::Tab;
use cv_01_metadata_registry::UpdatePlan;
use cv_03_payload_decoder::{Card, DecodedMessage, DecodedPayload};
use cv_04_signature_engine::{KeyHandle, Signature};
use serde::{Deserialize, Serialize};
use shared_types::{GenesisHash, UpdateCandidate};

/// Content of an open review screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Transaction to sign.
    Sign {
        /// Decoded payload.
        payload: Box<DecodedPayload>,
        /// Key able to sign for the author, if derived on this vault.
        key: Option<KeyHandle>,
    },
    /// Text message to sign.
    Message {
        /// Decoded message.
        message: DecodedMessage,
        /// Key able to sign for the author.
        key: Option<KeyHandle>,
    },
    /// Registry update awaiting approval.
    Stub {
        /// The update.
        candidate: UpdateCandidate,
        /// What accepting it would change.
        plan: UpdatePlan,
        /// Preview cards.
        cards: Vec<Card>,
    },
}

impl TransactionKind {
    /// Key that would sign, for signing flows.
    pub fn key(&self) -> Option<&KeyHandle> {
        match self {
            TransactionKind::Sign { key, .. } | TransactionKind::Message { key, .. } => {
                key.as_ref()
            }
            TransactionKind::Stub { .. } => None,
        }
    }

    /// Whether approving would produce a signature.
    pub fn is_signing(&self) -> bool {
        !matches!(self, TransactionKind::Stub { .. })
    }

    /// Whether the user may approve.
    pub fn is_approvable(&self) -> bool {
        match self {
            TransactionKind::Sign { payload, key } => payload.is_signable() && key.is_some(),
            TransactionKind::Message { key, .. } => key.is_some(),
            TransactionKind::Stub { .. } => true,
        }
    }
}

/// One frame of the screen stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    /// History log (home).
    Log,
    /// One history entry.
    LogDetails {
        /// Entry order.
        order: u32,
    },
    /// Camera.
    Scan,
    /// Seed list.
    SeedSelector,
    /// Keys of one seed.
    Keys {
        /// Seed name.
        seed_name: String,
    },
    /// One key.
    KeyDetails {
        /// The key.
        key: KeyHandle,
    },
    /// Settings.
    Settings,
    /// Known networks.
    ManageNetworks,
    /// One network.
    NetworkDetails {
        /// Network.
        genesis_hash: GenesisHash,
    },
    /// Review of a scanned payload.
    Transaction(Box<TransactionKind>),
}

impl Screen {
    /// Root screen of a tab.
    pub fn root(tab: Tab) -> Self {
        match tab {
            Tab::Log => Screen::Log,
            Tab::Scan => Screen::Scan,
            Tab::Keys => Screen::SeedSelector,
            Tab::Settings => Screen::Settings,
        }
    }

    /// Tab this screen belongs to when it is at the bottom of the stack.
    pub fn tab(&self) -> Tab {
        match self {
            Screen::Log | Screen::LogDetails { .. } => Tab::Log,
            Screen::Scan | Screen::Transaction(_) => Tab::Scan,
            Screen::SeedSelector | Screen::Keys { .. } | Screen::KeyDetails { .. } => Tab::Keys,
            Screen::Settings | Screen::ManageNetworks | Screen::NetworkDetails { .. } => {
                Tab::Settings
            }
        }
    }

    /// Name used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Log => "log",
            Screen::LogDetails { .. } => "log_details",
            Screen::Scan => "scan",
            Screen::SeedSelector => "seed_selector",
            Screen::Keys { .. } => "keys",
            Screen::KeyDetails { .. } => "key_details",
            Screen::Settings => "settings",
            Screen::ManageNetworks => "manage_networks",
            Screen::NetworkDetails { .. } => "network_details",
            Screen::Transaction(_) => "transaction",
        }
    }

    /// Whether this is a review screen.
    pub fn is_transaction(&self) -> bool {
        matches!(self, Screen::Transaction(_))
    }
}

/// Overlay on top of the current screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modal {
    /// Finished signature, shown as cycling frames.
    SignatureReady {
        /// The signature.
        signature: Signature,
        /// Encoded outbound frames.
        frames: Vec<Vec<u8>>,
    },
    /// Network picker.
    NetworkSelector,
}

/// Blocking message; only `GoBack` dismisses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alert {
    /// Something failed; the user may retry.
    Error(String),
    /// A multi-frame code was not read to the end. A new scan replaces it.
    ScanFailed(String),
    /// An update broke the verifier rules. Dismissing returns home.
    TrustViolation(String),
    /// A signing attempt failed.
    SignFailed {
        /// Why.
        reason: String,
        /// Attempts before the flow is discarded.
        attempts_left: u8,
    },
}

/// Whether a signature is being prepared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityContext {
    /// No signing flow.
    #[default]
    Idle,
    /// A signable review is open.
    SigningPending {
        /// Failed attempts so far.
        failed_attempts: u8,
    },
}

/// Complete navigation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavState {
    stack: Vec<Screen>,
    /// Open modal.
    pub modal: Option<Modal>,
    /// Open alert.
    pub alert: Option<Alert>,
    /// Signing context.
    pub security: SecurityContext,
    /// Network chosen for key derivation.
    pub network: Option<GenesisHash>,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            stack: vec![Screen::Log],
            modal: None,
            alert: None,
            security: SecurityContext::Idle,
            network: None,
        }
    }
}

impl NavState {
    /// Top of the stack.
    pub fn top(&self) -> &Screen {
        // The stack is never empty; `Log` stands in if it ever were.
        self.stack.last().unwrap_or(&Screen::Log)
    }

    /// Whole stack, bottom first.
    pub fn stack(&self) -> &[Screen] {
        &self.stack
    }

    /// Active footer tab.
    pub fn tab(&self) -> Tab {
        self.stack.first().map_or(Tab::Log, Screen::tab)
    }

    /// Open review, if the top screen is one.
    pub fn transaction(&self) -> Option<&TransactionKind> {
        match self.top() {
            Screen::Transaction(kind) => Some(kind),
            _ => None,
        }
    }

    /// Home screen, keeping the network chosen for derivation.
    pub fn home(network: Option<GenesisHash>) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    /// Push a screen. Covering a signing review abandons it, together with
    /// the key it held.
    pub fn push(&mut self, screen: Screen) {
        if self.transaction().is_some_and(TransactionKind::is_signing) {
            self.close_transaction();
        }
        self.stack.push(screen);
        self.settle();
    }

    /// Pop the top screen unless it is the last one. Returns the popped screen.
    pub fn pop(&mut self) -> Option<Screen> {
        let popped = if self.stack.len() > 1 { self.stack.pop() } else { None };
        self.settle();
        popped
    }

    /// Replace the stack with the root of `tab` and close overlays.
    pub fn reset(&mut self, tab: Tab) {
        self.stack = vec![Screen::root(tab)];
        self.modal = None;
        self.alert = None;
        self.settle();
    }

    /// Drop every review screen (and anything above it).
    pub fn close_transaction(&mut self) {
        if let Some(at) = self.stack.iter().position(Screen::is_transaction) {
            self.stack.truncate(at.max(1));
            if self.stack.iter().any(Screen::is_transaction) {
                self.stack = vec![Screen::root(Tab::Scan)];
            }
        }
        self.settle();
    }

    /// Keep the security context consistent with the stack: leaving the
    /// review screen discards a pending signature.
    fn settle(&mut self) {
        let signing_open = self
            .stack
            .iter()
            .any(|screen| matches!(screen, Screen::Transaction(kind) if kind.is_signing()));
        if !signing_open {
            self.security = SecurityContext::Idle;
        }
    }

    /// Open a review screen and set the security context for it.
    pub fn open_transaction(&mut self, kind: TransactionKind) {
        let pending = kind.is_signing() && kind.is_approvable();
        self.stack.push(Screen::Transaction(Box::new(kind)));
        self.security = if pending {
            SecurityContext::SigningPending { failed_attempts: 0 }
        } else {
            SecurityContext::Idle
        };
    }
}
