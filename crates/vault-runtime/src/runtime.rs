//! # Vault Runtime
//!
//! Spawns the three long-running tasks over a `VaultContext`:
//!
//! 1. Navigator control task (serializes every transition)
//! 2. Capture loop (raw frames into scan sessions)
//! 3. Scan event handler (reassembled payloads into the navigator)

use crate::container::VaultContext;
use crate::handlers::{CaptureLoop, ScanEventHandler};
use anyhow::{Context, Result};
use cv_05_navigation::{NavigationApi, NavigatorHandle};
use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Raw frames buffered between the camera and the capture loop.
pub const FRAME_QUEUE_CAPACITY: usize = 256;

/// How long `shutdown` waits for each task.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Running vault.
pub struct VaultRuntime {
    context: Arc<VaultContext>,
    navigator: NavigatorHandle,
    frames: mpsc::Sender<Vec<u8>>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl VaultRuntime {
    /// Start every task. Must be called inside a tokio runtime.
    pub fn start(context: VaultContext) -> Result<Self> {
        let events = context
            .take_events()
            .context("event queue receiver already taken")?;
        let context = Arc::new(context);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let (navigator, control) =
            NavigatorHandle::spawn(Arc::clone(&context.navigator), DEFAULT_CHANNEL_CAPACITY);

        let (frames, frame_rx) = mpsc::channel(FRAME_QUEUE_CAPACITY);
        let gc_interval =
            Duration::from_secs((context.config.transport.session_timeout_secs / 4).max(1));
        let reviews = Arc::clone(&context.navigator);
        let capture_loop = CaptureLoop::new(Arc::clone(&context.transport), frame_rx, gc_interval)
            .with_review_gate(move || reviews.state().transaction().is_some());
        let mut capture_shutdown = shutdown_rx.clone();
        let capture = tokio::spawn(async move {
            tokio::select! {
                _ = capture_loop.run() => {}
                _ = capture_shutdown.changed() => {
                    info!("[capture] Shutdown signal received");
                }
            }
        });

        let handler = ScanEventHandler::new(events, navigator.clone());
        let mut scan_shutdown = shutdown_rx;
        let scan = tokio::spawn(async move {
            tokio::select! {
                _ = handler.run() => {}
                _ = scan_shutdown.changed() => {
                    info!("[scan-events] Shutdown signal received");
                }
            }
        });

        info!("Vault runtime started");
        Ok(Self {
            context,
            navigator,
            frames,
            shutdown_tx,
            tasks: vec![("capture", capture), ("scan-events", scan), ("control", control)],
        })
    }

    /// Subsystems of this runtime.
    pub fn context(&self) -> Arc<VaultContext> {
        Arc::clone(&self.context)
    }

    /// Handle for submitting user actions.
    pub fn navigator(&self) -> NavigatorHandle {
        self.navigator.clone()
    }

    /// Sender for raw camera frames.
    pub fn frame_sender(&self) -> mpsc::Sender<Vec<u8>> {
        self.frames.clone()
    }

    /// Stop every task, aborting those that do not finish in time.
    ///
    /// The control task ends once every `NavigatorHandle` is dropped;
    /// handles cloned out of the runtime should be dropped first.
    pub async fn shutdown(self) {
        info!("Initiating vault shutdown");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        drop(self.frames);
        drop(self.navigator);

        for (name, task) in self.tasks {
            let abort = task.abort_handle();
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(task = name, error = %e, "Task ended abnormally"),
                Err(_) => {
                    warn!(task = name, "Task did not stop in time, aborting");
                    abort.abort();
                }
            }
        }
        info!("Vault shutdown complete");
    }
}
