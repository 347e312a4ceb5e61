//! # Scan Event Handler
//!
//! Drains the event queue and hands every reassembled payload to the
//! navigator as `TransactionFetched`. The navigator decides whether it is a
//! transaction, a message or an update. A failed scan becomes a
//! dismissible alert asking for the code again.

use cv_05_navigation::{Action, NavigationError, NavigatorHandle};
use shared_bus::{EventReceiver, VaultEvent};
use tracing::{debug, error, info, warn};

/// Consumer side of the event queue.
pub struct ScanEventHandler {
    receiver: EventReceiver,
    navigator: NavigatorHandle,
}

impl ScanEventHandler {
    /// Handler forwarding to `navigator`.
    pub fn new(receiver: EventReceiver, navigator: NavigatorHandle) -> Self {
        Self { receiver, navigator }
    }

    /// Run until the queue or the navigator closes. Returns the number of
    /// payloads forwarded.
    pub async fn run(mut self) -> usize {
        info!("Scan event handler started");
        let mut forwarded = 0;

        while let Some(event) = self.receiver.recv().await {
            match event {
                VaultEvent::PayloadReassembled { session_id, payload } => {
                    let result = self
                        .navigator
                        .perform(Action::TransactionFetched, hex::encode(&payload), None)
                        .await;
                    match result {
                        Ok(result) => {
                            forwarded += 1;
                            info!(
                                session = %session_id,
                                payload_len = payload.len(),
                                screen = %result.screen_label,
                                alert = result.alert_data.is_some(),
                                "Scanned payload opened"
                            );
                        }
                        Err(NavigationError::Closed) => {
                            error!(
                                session = %session_id,
                                "Navigator closed, dropping scanned payload"
                            );
                            break;
                        }
                        Err(e) => {
                            warn!(session = %session_id, error = %e, "Scanned payload rejected");
                        }
                    }
                }
                VaultEvent::ScanFailed { session_id, reason } => {
                    warn!(session = %session_id, reason = %reason, "Scan failed, rescan needed");
                    match self.navigator.perform(Action::ScanFailed, reason, None).await {
                        Ok(_) => {}
                        Err(NavigationError::Closed) => break,
                        Err(e) => {
                            debug!(session = %session_id, error = %e, "Scan failure not shown");
                        }
                    }
                }
                VaultEvent::ScanCancelled { session_id } => {
                    debug!(session = %session_id, "Scan cancelled");
                }
            }
        }

        info!(forwarded, "Scan event handler stopped");
        forwarded
    }
}
