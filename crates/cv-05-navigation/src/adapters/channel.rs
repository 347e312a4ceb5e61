//! # Navigator Channel
//!
//! Message-passing front end for the navigator. Commands are queued on an
//! mpsc channel and executed one at a time by a single control task; each
//! caller waits on its own oneshot reply.
//!
//! ```text
//! capture loop ──┐
//!                ├──→ mpsc<NavCommand> ──→ control task ──→ Navigator::perform
//! screen layer ──┘                              │
//!                    oneshot reply ←────────────┘
//! ```

use crate::domain::action::Action;
use crate::domain::errors::NavigationError;
use crate::domain::result::ActionResult;
use crate::ports::inbound::NavigationApi;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use zeroize::Zeroizing;

type Reply = oneshot::Sender<Result<ActionResult, NavigationError>>;

struct NavCommand {
    action: Action,
    details: Zeroizing<String>,
    secret: Option<Zeroizing<String>>,
    reply: Reply,
}

/// Cloneable sender side of the control task.
#[derive(Clone)]
pub struct NavigatorHandle {
    commands: mpsc::Sender<NavCommand>,
}

impl NavigatorHandle {
    /// Spawn the control task on the current runtime.
    ///
    /// The task ends when every handle is dropped.
    pub fn spawn<N>(navigator: Arc<N>, capacity: usize) -> (Self, JoinHandle<()>)
    where
        N: NavigationApi + 'static,
    {
        let (commands, receiver) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(run(navigator, receiver));
        (Self { commands }, task)
    }

    /// Queue an action and wait for its result. `details` may carry a path
    /// password, so it is wiped once the action ran.
    pub async fn perform(
        &self,
        action: Action,
        details: impl Into<String>,
        secret: Option<String>,
    ) -> Result<ActionResult, NavigationError> {
        let (reply, response) = oneshot::channel();
        let command = NavCommand {
            action,
            details: Zeroizing::new(details.into()),
            secret: secret.map(Zeroizing::new),
            reply,
        };
        self.commands
            .send(command)
            .await
            .map_err(|_| NavigationError::Closed)?;
        response.await.map_err(|_| NavigationError::Closed)?
    }
}

async fn run<N>(navigator: Arc<N>, mut receiver: mpsc::Receiver<NavCommand>)
where
    N: NavigationApi + 'static,
{
    info!("Navigator control task started");
    while let Some(command) = receiver.recv().await {
        let NavCommand {
            action,
            details,
            secret,
            reply,
        } = command;
        debug!(action = %action, "Navigator command received");

        // Decoding and signing are CPU-bound; keep them off the async workers.
        let worker = Arc::clone(&navigator);
        let result = tokio::task::spawn_blocking(move || {
            worker.perform(action, &details, secret.as_deref().map(String::as_str))
        })
        .await;

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                error!(action = %action, error = %e, "Navigator transition panicked");
                Err(NavigationError::Closed)
            }
        };
        if reply.send(result).is_err() {
            debug!(action = %action, "Caller dropped before the reply");
        }
    }
    info!("Navigator control task stopped");
}
