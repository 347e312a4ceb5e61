//! # Inbound Ports (Driving Ports / API)

use crate::domain::action::Action;
use crate::domain::errors::NavigationError;
use crate::domain::result::ActionResult;
use crate::domain::state::NavState;

/// Primary Navigation API.
///
/// Transitions are serialized: concurrent callers wait for the running one.
pub trait NavigationApi: Send + Sync {
    /// Apply an action.
    ///
    /// `secret` is the seed phrase for `ApproveSign` and is ignored otherwise.
    /// On error the state is unchanged.
    fn perform(
        &self,
        action: Action,
        details: &str,
        secret: Option<&str>,
    ) -> Result<ActionResult, NavigationError>;

    /// Render the current state without changing it.
    fn current(&self) -> ActionResult;

    /// Copy of the current state.
    fn state(&self) -> NavState;
}
