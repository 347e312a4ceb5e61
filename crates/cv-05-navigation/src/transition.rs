//! # Transitions
//!
//! `apply` computes the next state and its render instruction from the
//! current state and one action. The input state is never touched. Subsystem
//! failures become alerts; only malformed or out-of-place actions are
//! errors.
//!
//! External effects are limited to registry writes and history appends,
//! which happen only on an explicit action (`ApproveSign`, `DeriveKey`,
//! `RemoveNetwork`, `RemoveMetadata`).

use crate::domain::action::{Action, Tab};
use crate::domain::config::NavigationConfig;
use crate::domain::errors::NavigationError;
use crate::domain::result::{
    ActionResult, AlertData, LogLine, ModalData, NetworkSummary, RightButton, ScreenData,
    ScreenNameType,
};
use crate::domain::state::{Alert, Modal, NavState, Screen, SecurityContext, TransactionKind};
use crate::ports::outbound::{FrameEncoder, HistoryStore};
use cv_01_metadata_registry::{MetadataRegistryApi, RegistryError, RegistryWarning};
use cv_03_payload_decoder::{Card, CardContent, ParsedPayload, PayloadDecoderApi};
use cv_04_signature_engine::{SignatureEngineApi, UnlockContext};
use shared_types::{GenesisHash, HistoryEvent, UpdateCandidate, UpdateKind};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Everything a transition may consult.
pub struct NavContext<'a> {
    /// Metadata registry.
    pub registry: &'a dyn MetadataRegistryApi,
    /// Payload decoder.
    pub decoder: &'a dyn PayloadDecoderApi,
    /// Signature engine.
    pub signer: &'a dyn SignatureEngineApi,
    /// History log.
    pub history: &'a dyn HistoryStore,
    /// Outbound frame encoder.
    pub frames: &'a dyn FrameEncoder,
    /// Limits.
    pub config: &'a NavigationConfig,
}

/// Apply `action` to `state`.
pub fn apply(
    state: &NavState,
    action: Action,
    details: &str,
    secret: Option<&str>,
    ctx: &NavContext<'_>,
) -> Result<(NavState, ActionResult), NavigationError> {
    if let Some(alert) = &state.alert {
        let rescan = matches!(alert, Alert::ScanFailed(_))
            && matches!(
                action,
                Action::TransactionFetched | Action::LoadMetadata | Action::AddNetworkSpec
            );
        if !rescan && !matches!(action, Action::GoBack | Action::Start | Action::Cancel) {
            return Err(NavigationError::AlertPending);
        }
    }

    let mut next = state.clone();
    match action {
        Action::Start => next = NavState::home(state.network),
        Action::GoBack => go_back(&mut next),
        Action::Navigate => {
            let screen = match details {
                "log" => Screen::Log,
                "scan" => Screen::Scan,
                "seeds" => Screen::SeedSelector,
                "settings" => Screen::Settings,
                "networks" => Screen::ManageNetworks,
                other => return Err(invalid(action, format!("unknown screen {other:?}"))),
            };
            next.modal = None;
            next.push(screen);
        }
        Action::SelectTab => {
            let tab = Tab::parse(details)
                .ok_or_else(|| invalid(action, format!("unknown tab {details:?}")))?;
            next.reset(tab);
        }
        Action::SelectSeed => select_seed(&mut next, details, ctx)?,
        Action::SelectKey => select_key(&mut next, details, ctx)?,
        Action::SelectNetwork => select_network(&mut next, details, ctx)?,
        Action::DeriveKey => derive_key(&mut next, details, ctx)?,
        Action::TransactionFetched => {
            transaction_fetched(&mut next, &payload_bytes(action, details)?, ctx)
        }
        Action::LoadMetadata => {
            let payload = payload_bytes(action, details)?;
            load_update(&mut next, action, UpdateKind::LoadMetadata, &payload, ctx)?
        }
        Action::AddNetworkSpec => {
            let payload = payload_bytes(action, details)?;
            load_update(&mut next, action, UpdateKind::AddSpecs, &payload, ctx)?
        }
        Action::ApproveSign => approve(&mut next, details, secret, ctx)?,
        Action::Cancel => {
            if matches!(next.alert, Some(Alert::TrustViolation(_))) {
                next.reset(Tab::Log);
            } else {
                next.close_transaction();
                next.modal = None;
                next.alert = None;
            }
        }
        Action::RightButton => match next.top() {
            Screen::Keys { .. } => next.modal = Some(Modal::NetworkSelector),
            other => return Err(not_available(action, other)),
        },
        Action::ShowLogDetails => {
            if !matches!(next.top(), Screen::Log) {
                return Err(not_available(action, next.top()));
            }
            let order: u32 = details
                .parse()
                .map_err(|_| invalid(action, format!("not an entry order: {details:?}")))?;
            if ctx.history.entry(order).is_none() {
                return Err(NavigationError::UnknownLogEntry(order));
            }
            next.push(Screen::LogDetails { order });
        }
        Action::RemoveNetwork => remove_network(&mut next, ctx)?,
        Action::RemoveMetadata => remove_metadata(&mut next, details, ctx)?,
        Action::ScanFailed => {
            let reason = if details.is_empty() { "code incomplete" } else { details };
            warn!(reason, "Scan failed");
            next.alert = Some(Alert::ScanFailed(format!(
                "Scan failed ({reason}). Scan the code again"
            )));
        }
    }

    debug!(
        action = %action,
        screen = next.top().name(),
        depth = next.stack().len(),
        modal = next.modal.is_some(),
        alert = next.alert.is_some(),
        "Transition applied"
    );
    let result = render(&next, ctx);
    Ok((next, result))
}

fn invalid(action: Action, reason: String) -> NavigationError {
    NavigationError::InvalidDetails {
        action: action.name(),
        reason,
    }
}

fn not_available(action: Action, screen: &Screen) -> NavigationError {
    NavigationError::NotAvailable {
        action: action.name(),
        screen: screen.name(),
    }
}

fn payload_bytes(action: Action, details: &str) -> Result<Vec<u8>, NavigationError> {
    let text = details.trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(text).map_err(|e| invalid(action, format!("payload is not hex: {e}")))
}

fn parse_genesis(action: Action, details: &str) -> Result<GenesisHash, NavigationError> {
    let bytes = payload_bytes(action, details)?;
    GenesisHash::try_from(bytes.as_slice()).map_err(|_| {
        invalid(
            action,
            format!("genesis hash must be 32 bytes, got {}", bytes.len()),
        )
    })
}

fn go_back(state: &mut NavState) {
    if let Some(alert) = state.alert.take() {
        if matches!(alert, Alert::TrustViolation(_)) {
            state.reset(Tab::Log);
        }
    } else if let Some(modal) = state.modal.take() {
        if matches!(modal, Modal::SignatureReady { .. }) {
            state.reset(Tab::Log);
        }
    } else {
        state.pop();
    }
}

fn select_seed(
    state: &mut NavState,
    name: &str,
    ctx: &NavContext<'_>,
) -> Result<(), NavigationError> {
    if !matches!(state.top(), Screen::SeedSelector) {
        return Err(not_available(Action::SelectSeed, state.top()));
    }
    if !ctx.signer.seed_names().iter().any(|seed| seed == name) {
        return Err(NavigationError::UnknownSeed(name.to_string()));
    }
    state.push(Screen::Keys {
        seed_name: name.to_string(),
    });
    Ok(())
}

fn select_key(
    state: &mut NavState,
    public_hex: &str,
    ctx: &NavContext<'_>,
) -> Result<(), NavigationError> {
    let Screen::Keys { seed_name } = state.top() else {
        return Err(not_available(Action::SelectKey, state.top()));
    };
    let wanted = public_hex.trim().to_ascii_lowercase();
    let key = ctx
        .signer
        .keys(seed_name)
        .into_iter()
        .find(|key| key.public_hex() == wanted)
        .ok_or_else(|| NavigationError::UnknownKey(public_hex.to_string()))?;
    state.push(Screen::KeyDetails { key });
    Ok(())
}

fn select_network(
    state: &mut NavState,
    details: &str,
    ctx: &NavContext<'_>,
) -> Result<(), NavigationError> {
    let genesis_hash = parse_genesis(Action::SelectNetwork, details)?;
    if ctx.registry.network_specs(&genesis_hash).is_none() {
        return Err(NavigationError::UnknownNetwork(hex::encode(genesis_hash)));
    }
    if matches!(state.top(), Screen::ManageNetworks) {
        state.push(Screen::NetworkDetails { genesis_hash });
    } else {
        state.network = Some(genesis_hash);
        state.modal = None;
    }
    Ok(())
}

fn derive_key(
    state: &mut NavState,
    path: &str,
    ctx: &NavContext<'_>,
) -> Result<(), NavigationError> {
    let Screen::Keys { seed_name } = state.top() else {
        return Err(not_available(Action::DeriveKey, state.top()));
    };
    let seed_name = seed_name.clone();
    let genesis_hash = state.network.ok_or(NavigationError::NoNetworkSelected)?;
    let specs = ctx
        .registry
        .network_specs(&genesis_hash)
        .ok_or_else(|| NavigationError::UnknownNetwork(hex::encode(genesis_hash)))?;
    let path = if path.is_empty() {
        specs.default_path.as_str()
    } else {
        path
    };

    match ctx.signer.derive(&seed_name, path, specs.encryption) {
        Ok(key) => {
            ctx.history.append(HistoryEvent::KeyDerived {
                seed_name,
                path: key.path.clone(),
                signer: key.signer(),
            });
            state.push(Screen::KeyDetails { key });
        }
        Err(e) => {
            warn!(seed = %seed_name, error = %e, "Key derivation failed");
            state.alert = Some(Alert::Error(e.to_string()));
        }
    }
    Ok(())
}

fn transaction_fetched(state: &mut NavState, payload: &[u8], ctx: &NavContext<'_>) {
    state.reset(Tab::Scan);
    match ctx.decoder.parse(payload) {
        Ok(ParsedPayload::Transaction(payload)) => {
            let key = ctx.signer.key_for(&payload.author);
            info!(
                network = %payload.network_name,
                known_author = key.is_some(),
                signable = payload.is_signable(),
                "Transaction opened for review"
            );
            state.open_transaction(TransactionKind::Sign { payload, key });
        }
        Ok(ParsedPayload::Message(message)) => {
            let key = ctx.signer.key_for(&message.author);
            state.open_transaction(TransactionKind::Message { message, key });
        }
        Ok(ParsedPayload::Update(candidate)) => open_update(state, candidate, ctx),
        Err(e) => {
            state.alert = Some(Alert::Error(format!("Payload could not be decoded: {e}")))
        }
    }
}

fn load_update(
    state: &mut NavState,
    action: Action,
    expected: UpdateKind,
    payload: &[u8],
    ctx: &NavContext<'_>,
) -> Result<(), NavigationError> {
    let candidate = match ctx.decoder.parse_update(payload) {
        Ok(candidate) => candidate,
        Err(e) => {
            state.reset(Tab::Scan);
            state.alert = Some(Alert::Error(format!("Update could not be decoded: {e}")));
            return Ok(());
        }
    };
    if candidate.kind() != expected {
        return Err(invalid(
            action,
            format!("payload is a {:?} update", candidate.kind()),
        ));
    }
    state.reset(Tab::Scan);
    open_update(state, candidate, ctx);
    Ok(())
}

fn registry_alert(error: &RegistryError) -> Alert {
    if error.is_trust_violation() {
        Alert::TrustViolation(error.to_string())
    } else {
        Alert::Error(error.to_string())
    }
}

fn warning_text(warning: &RegistryWarning) -> &'static str {
    match warning {
        RegistryWarning::NotVerified => "Update is not signed by a verifier",
        RegistryWarning::VerifierUpgraded => "Network verifier will be set to the update signer",
        RegistryWarning::NewNetwork => "Network is new to this vault",
        RegistryWarning::ContentAlreadyKnown => {
            "Content is already stored; only the verifier changes"
        }
    }
}

fn open_update(state: &mut NavState, candidate: UpdateCandidate, ctx: &NavContext<'_>) {
    match ctx.registry.evaluate(&candidate) {
        Ok(plan) => {
            let mut cards: Vec<Card> = plan
                .warnings
                .iter()
                .map(|warning| Card::warning(warning_text(warning), 0))
                .collect();
            cards.extend(ctx.decoder.update_cards(&candidate));
            state.open_transaction(TransactionKind::Stub {
                candidate,
                plan,
                cards,
            });
        }
        Err(e) => {
            warn!(error = %e, "Update preview refused");
            state.alert = Some(registry_alert(&e));
        }
    }
}

fn approve(
    state: &mut NavState,
    details: &str,
    secret: Option<&str>,
    ctx: &NavContext<'_>,
) -> Result<(), NavigationError> {
    let kind = state
        .transaction()
        .cloned()
        .ok_or(NavigationError::NothingToApprove)?;
    if let TransactionKind::Stub { candidate, .. } = &kind {
        match ctx.registry.accept(candidate) {
            Ok(plan) => {
                info!(network = %plan.network_name, kind = ?plan.kind, "Update accepted");
                state.reset(Tab::Log);
            }
            Err(e) => {
                state.close_transaction();
                state.alert = Some(registry_alert(&e));
            }
        }
        return Ok(());
    }

    let SecurityContext::SigningPending { failed_attempts } = state.security else {
        return Err(NavigationError::NothingToApprove);
    };
    if !kind.is_approvable() {
        return Err(NavigationError::NotSignable);
    }
    let seed_phrase = secret.ok_or(NavigationError::SecretRequired)?;
    let key = kind.key().ok_or(NavigationError::NotSignable)?;
    let signable = match &kind {
        TransactionKind::Sign { payload, .. } => &payload.signable,
        TransactionKind::Message { message, .. } => &message.signable,
        TransactionKind::Stub { .. } => return Err(NavigationError::NotSignable),
    };
    let unlock = UnlockContext::from_secrets(
        Zeroizing::new(seed_phrase.to_owned()),
        (!details.is_empty()).then(|| Zeroizing::new(details.to_owned())),
    );

    let signature = match ctx.signer.sign(key, signable, unlock) {
        Ok(signature) => signature,
        Err(e) => {
            let failed = failed_attempts.saturating_add(1);
            ctx.history.append(HistoryEvent::SignFailed {
                genesis_hash: signable.genesis_hash,
                signer: key.signer(),
                reason: e.to_string(),
            });
            if failed >= ctx.config.max_sign_attempts {
                warn!(attempts = failed, "Signing flow discarded after repeated failures");
                state.reset(Tab::Log);
                state.alert = Some(Alert::SignFailed {
                    reason: format!("{e}; too many attempts, transaction discarded"),
                    attempts_left: 0,
                });
            } else {
                state.security = SecurityContext::SigningPending {
                    failed_attempts: failed,
                };
                state.alert = Some(Alert::SignFailed {
                    reason: e.to_string(),
                    attempts_left: ctx.config.max_sign_attempts - failed,
                });
            }
            return Ok(());
        }
    };

    let frames = match ctx.frames.encode_frames(&signature.to_tagged_bytes()) {
        Ok(frames) => frames,
        Err(e) => {
            state.alert = Some(Alert::Error(format!("Signature could not be encoded: {e}")));
            return Ok(());
        }
    };

    let event = match &kind {
        TransactionKind::Message { message, .. } => HistoryEvent::MessageSigned {
            genesis_hash: signable.genesis_hash,
            signer: key.signer(),
            message: message.message.clone(),
        },
        _ => HistoryEvent::TransactionSigned {
            genesis_hash: signable.genesis_hash,
            signer: key.signer(),
            digest: shared_crypto::blake3_hash(&signable.bytes),
        },
    };
    ctx.history.append(event);
    info!(frames = frames.len(), public = %key.public_hex(), "Signature ready");

    state.security = SecurityContext::Idle;
    state.modal = Some(Modal::SignatureReady { signature, frames });
    Ok(())
}

fn remove_network(state: &mut NavState, ctx: &NavContext<'_>) -> Result<(), NavigationError> {
    let Screen::NetworkDetails { genesis_hash } = *state.top() else {
        return Err(not_available(Action::RemoveNetwork, state.top()));
    };
    match ctx.registry.remove_network(&genesis_hash) {
        Ok(removal) => {
            info!(
                network = %removal.network_name,
                versions = removal.spec_versions.len(),
                disabled = removal.disabled,
                "Network removed"
            );
            if state.network == Some(genesis_hash) {
                state.network = None;
            }
            state.pop();
        }
        Err(e) => {
            warn!(error = %e, "Network removal refused");
            state.alert = Some(registry_alert(&e));
        }
    }
    Ok(())
}

fn remove_metadata(
    state: &mut NavState,
    details: &str,
    ctx: &NavContext<'_>,
) -> Result<(), NavigationError> {
    let Screen::NetworkDetails { genesis_hash } = *state.top() else {
        return Err(not_available(Action::RemoveMetadata, state.top()));
    };
    let spec_version: u32 = details.trim().parse().map_err(|_| {
        invalid(
            Action::RemoveMetadata,
            format!("not a spec version: {details:?}"),
        )
    })?;
    if let Err(e) = ctx.registry.remove_metadata(&genesis_hash, spec_version) {
        warn!(error = %e, spec_version, "Metadata removal refused");
        state.alert = Some(registry_alert(&e));
    }
    Ok(())
}

// =============================================================================
// RENDERING
// =============================================================================

/// Render instruction for `state`.
pub fn render(state: &NavState, ctx: &NavContext<'_>) -> ActionResult {
    let top = state.top();
    let reviewing = top.is_transaction();
    ActionResult {
        screen_label: screen_label(top, ctx),
        back: state.stack().len() > 1,
        footer: !reviewing,
        footer_button: (!reviewing).then(|| state.tab()),
        right_button: matches!(top, Screen::Keys { .. }).then_some(RightButton::NetworkSelector),
        screen_name_type: if state.stack().len() == 1 {
            ScreenNameType::H1
        } else {
            ScreenNameType::H4
        },
        screen_data: screen_data(state, top, ctx),
        modal_data: state.modal.as_ref().map(|modal| modal_data(modal, state, ctx)),
        alert_data: state.alert.as_ref().map(alert_data),
    }
}

fn screen_label(screen: &Screen, ctx: &NavContext<'_>) -> String {
    match screen {
        Screen::Log => "Log".into(),
        Screen::LogDetails { .. } => "Event details".into(),
        Screen::Scan => String::new(),
        Screen::SeedSelector => "Select seed".into(),
        Screen::Keys { seed_name } => seed_name.clone(),
        Screen::KeyDetails { .. } => "Key".into(),
        Screen::Settings => "Settings".into(),
        Screen::ManageNetworks => "Networks".into(),
        Screen::NetworkDetails { genesis_hash } => ctx
            .registry
            .network_specs(genesis_hash)
            .map_or_else(|| "Network".into(), |specs| specs.title),
        Screen::Transaction(kind) => match **kind {
            TransactionKind::Sign { .. } => "Transaction".into(),
            TransactionKind::Message { .. } => "Message".into(),
            TransactionKind::Stub { .. } => "Update".into(),
        },
    }
}

fn networks(state: &NavState, ctx: &NavContext<'_>) -> Vec<NetworkSummary> {
    ctx.registry
        .networks()
        .iter()
        .map(|specs| NetworkSummary::new(specs, state.network == Some(specs.genesis_hash)))
        .collect()
}

fn screen_data(state: &NavState, screen: &Screen, ctx: &NavContext<'_>) -> ScreenData {
    match screen {
        Screen::Log => ScreenData::Log {
            entries: ctx
                .history
                .entries()
                .iter()
                .rev()
                .take(ctx.config.log_entries_shown)
                .map(LogLine::from)
                .collect(),
        },
        Screen::LogDetails { order } => ScreenData::LogDetails {
            entry: ctx.history.entry(*order),
        },
        Screen::Scan => ScreenData::Scan,
        Screen::SeedSelector => ScreenData::SeedSelector {
            seeds: ctx.signer.seed_names(),
        },
        Screen::Keys { seed_name } => ScreenData::Keys {
            seed_name: seed_name.clone(),
            network: state
                .network
                .and_then(|genesis_hash| ctx.registry.network_specs(&genesis_hash))
                .map(|specs| NetworkSummary::new(&specs, true)),
            keys: ctx.signer.keys(seed_name),
        },
        Screen::KeyDetails { key } => ScreenData::KeyDetails { key: key.clone() },
        Screen::Settings => ScreenData::Settings {
            networks: ctx.registry.networks().len(),
        },
        Screen::ManageNetworks => ScreenData::ManageNetworks {
            networks: networks(state, ctx),
        },
        Screen::NetworkDetails { genesis_hash } => ScreenData::NetworkDetails {
            specs: ctx.registry.network_specs(genesis_hash),
            verifier: ctx.registry.verifier(genesis_hash),
            versions: ctx.registry.metadata_versions(genesis_hash),
        },
        Screen::Transaction(kind) => transaction_data(kind),
    }
}

fn transaction_data(kind: &TransactionKind) -> ScreenData {
    let (label, cards) = match kind {
        TransactionKind::Sign { payload, .. } => ("transaction", payload.cards()),
        TransactionKind::Message { message, .. } => (
            "message",
            vec![
                Card::new(
                    CardContent::Author {
                        signer: message.author.clone(),
                    },
                    0,
                ),
                message.card.clone(),
            ],
        ),
        TransactionKind::Stub { cards, .. } => ("update", cards.clone()),
    };
    ScreenData::Transaction {
        kind: label.into(),
        cards,
        author: kind.key().cloned(),
        approvable: kind.is_approvable(),
    }
}

fn modal_data(modal: &Modal, state: &NavState, ctx: &NavContext<'_>) -> ModalData {
    match modal {
        Modal::SignatureReady { signature, frames } => ModalData::SignatureReady {
            signature: signature.to_hex(),
            frames: frames.iter().map(hex::encode).collect(),
        },
        Modal::NetworkSelector => ModalData::NetworkSelector {
            networks: networks(state, ctx),
        },
    }
}

fn alert_data(alert: &Alert) -> AlertData {
    match alert {
        Alert::Error(message) => AlertData::Error {
            message: message.clone(),
        },
        Alert::ScanFailed(message) => AlertData::ScanFailed {
            message: message.clone(),
        },
        Alert::TrustViolation(message) => AlertData::TrustViolation {
            message: message.clone(),
        },
        Alert::SignFailed {
            reason,
            attempts_left,
        } => AlertData::SignFailed {
            message: reason.clone(),
            attempts_left: *attempts_left,
        },
    }
}
