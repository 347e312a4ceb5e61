//! # Navigator Service
//!
//! Owns the navigation state. The lock is held for the whole transition, so
//! concurrent callers queue and every transition sees the result of the one
//! before it.

use crate::domain::action::Action;
use crate::domain::config::NavigationConfig;
use crate::domain::errors::NavigationError;
use crate::domain::result::ActionResult;
use crate::domain::state::NavState;
use crate::ports::inbound::NavigationApi;
use crate::ports::outbound::{FrameEncoder, HistoryStore};
use crate::transition::{apply, render, NavContext};
use cv_01_metadata_registry::MetadataRegistryApi;
use cv_03_payload_decoder::PayloadDecoderApi;
use cv_04_signature_engine::SignatureEngineApi;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

/// Subsystems the navigator drives.
#[derive(Clone)]
pub struct NavigatorDeps {
    /// Metadata registry.
    pub registry: Arc<dyn MetadataRegistryApi>,
    /// Payload decoder.
    pub decoder: Arc<dyn PayloadDecoderApi>,
    /// Signature engine.
    pub signer: Arc<dyn SignatureEngineApi>,
    /// History log.
    pub history: Arc<dyn HistoryStore>,
    /// Outbound frame encoder.
    pub frames: Arc<dyn FrameEncoder>,
}

/// The Navigator Service.
pub struct Navigator {
    state: Mutex<NavState>,
    deps: NavigatorDeps,
    config: NavigationConfig,
}

impl Navigator {
    /// Navigator on the home screen.
    pub fn new(deps: NavigatorDeps, config: NavigationConfig) -> Self {
        Self {
            state: Mutex::new(NavState::default()),
            deps,
            config,
        }
    }

    fn context(&self) -> NavContext<'_> {
        NavContext {
            registry: self.deps.registry.as_ref(),
            decoder: self.deps.decoder.as_ref(),
            signer: self.deps.signer.as_ref(),
            history: self.deps.history.as_ref(),
            frames: self.deps.frames.as_ref(),
            config: &self.config,
        }
    }
}

impl NavigationApi for Navigator {
    fn perform(
        &self,
        action: Action,
        details: &str,
        secret: Option<&str>,
    ) -> Result<ActionResult, NavigationError> {
        let mut state = self.state.lock();
        match apply(&state, action, details, secret, &self.context()) {
            Ok((next, result)) => {
                *state = next;
                Ok(result)
            }
            Err(e) => {
                warn!(
                    action = %action,
                    screen = state.top().name(),
                    error = %e,
                    "Action rejected"
                );
                Err(e)
            }
        }
    }

    fn current(&self) -> ActionResult {
        render(&self.state.lock(), &self.context())
    }

    fn state(&self) -> NavState {
        self.state.lock().clone()
    }
}
