//! # Event Receiver
//!
//! The consuming side of the queue.

use crate::events::VaultEvent;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from receive operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Every publisher was dropped.
    #[error("Event queue closed")]
    Closed,
}

/// The single consumer of the queue.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct EventReceiver {
    receiver: mpsc::Receiver<VaultEvent>,
}

impl EventReceiver {
    pub(crate) fn new(receiver: mpsc::Receiver<VaultEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - The next event
    /// - `None` - The queue was closed
    pub async fn recv(&mut self) -> Option<VaultEvent> {
        self.receiver.recv().await
    }

    /// Try to receive the next event without waiting.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` - An event was available
    /// - `Ok(None)` - Nothing queued
    /// - `Err(SubscriptionError::Closed)` - The queue was closed
    pub fn try_recv(&mut self) -> Result<Option<VaultEvent>, SubscriptionError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => {
                debug!("Event queue closed");
                Err(SubscriptionError::Closed)
            }
        }
    }
}

impl Stream for EventReceiver {
    type Item = VaultEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
