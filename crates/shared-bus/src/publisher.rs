//! # Event Publisher
//!
//! Defines the publishing side of the queue.

use crate::events::VaultEvent;
use crate::subscriber::EventReceiver;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Trait for publishing events to the queue.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event.
    ///
    /// # Returns
    ///
    /// `true` if the event was queued, `false` if the consumer is gone.
    async fn publish(&self, event: VaultEvent) -> bool;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory queue over `tokio::sync::mpsc`.
///
/// Multi-producer, single-consumer: the receiver is handed out once.
pub struct InMemoryEventQueue {
    /// Sending half, cloned per publish.
    sender: mpsc::Sender<VaultEvent>,

    /// Receiving half until the consumer claims it.
    receiver: Mutex<Option<mpsc::Receiver<VaultEvent>>>,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventQueue {
    /// Create a queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a queue with the given capacity (at least 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Claim the single consumer end. Returns `None` once claimed.
    #[must_use]
    pub fn take_receiver(&self) -> Option<EventReceiver> {
        let receiver = self.receiver.lock().take()?;
        debug!("Event queue consumer attached");
        Some(EventReceiver::new(receiver))
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventQueue {
    async fn publish(&self, event: VaultEvent) -> bool {
        let topic = event.topic();
        let session_id = event.session_id();

        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event).await {
            Ok(()) => {
                debug!(topic = ?topic, %session_id, "Event published");
                true
            }
            Err(_) => {
                warn!(topic = ?topic, %session_id, "Event dropped (consumer closed)");
                false
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
