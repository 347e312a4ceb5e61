//! # Verifier Pinning
//!
//! Pure decision table for how a candidate's verifier interacts with the
//! network's current pin. `G` is the vault-wide general verifier; a
//! `General` pin follows it. Pins only ever move from `None` to a concrete
//! key; a concrete pin never changes, and a dead pin refuses everything.
//!
//! | Current pin | Candidate | Outcome |
//! |-------------|-----------|---------|
//! | no record | signed by G | `Establish(General)` |
//! | no record | anything else | `Establish(Custom(candidate))` |
//! | `Dead` | any | `NetworkDisabled` |
//! | `None` | unsigned | `Keep` + `NotVerified` |
//! | `None` | signed by G | `Upgrade(General)` |
//! | `None` | signed by V | `Upgrade(Custom(V))` |
//! | `V` | signed by V | `Keep` |
//! | `V` | unsigned | `VerifierDisappeared` |
//! | `V` | signed by W | `VerifierChanged` |
//!
//! A `General` pin reads as `G` in the rows above.

use crate::domain::entities::{NetworkPin, PinTransition, RegistryWarning};
use crate::domain::errors::TrustViolation;
use shared_types::Verifier;

/// Apply the pinning table.
///
/// `current` is `None` when the network has no record at all.
pub fn check_pin(
    current: Option<&NetworkPin>,
    general: &Verifier,
    claimed: &Verifier,
) -> Result<(PinTransition, Vec<RegistryWarning>), TrustViolation> {
    let mut warnings = Vec::new();
    if !claimed.is_pinned() {
        warnings.push(RegistryWarning::NotVerified);
    }
    let offered = if general.is_pinned() && claimed == general {
        NetworkPin::General
    } else {
        NetworkPin::Custom(claimed.clone())
    };

    let Some(current) = current else {
        warnings.push(RegistryWarning::NewNetwork);
        return Ok((PinTransition::Establish(offered), warnings));
    };
    let pinned = current
        .resolve(general)
        .ok_or(TrustViolation::NetworkDisabled)?;

    let transition = match (pinned.signer(), claimed.signer()) {
        (None, None) => PinTransition::Keep,
        (None, Some(_)) => {
            warnings.push(RegistryWarning::VerifierUpgraded);
            PinTransition::Upgrade(offered)
        }
        (Some(_), None) => return Err(TrustViolation::VerifierDisappeared { pinned }),
        (Some(held), Some(signer)) if held == signer => PinTransition::Keep,
        (Some(_), Some(_)) => {
            return Err(TrustViolation::VerifierChanged {
                pinned,
                offered: claimed.clone(),
            })
        }
    };
    Ok((transition, warnings))
}
