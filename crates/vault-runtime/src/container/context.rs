//! # Vault Context
//!
//! Every subsystem, built once at startup and shared through `Arc`.
//!
//! ## Initialization Order
//!
//! 1. History log (shared by registry and navigator)
//! 2. Metadata registry
//! 3. Event queue and capture service
//! 4. Payload decoder over the registry
//! 5. Seed source and signature engine
//! 6. Navigator over all of the above

use crate::adapters::RegistryLookup;
use crate::container::config::{ConfigError, VaultConfig};
use cv_01_metadata_registry::{
    DefaultSignatureChecker, InMemoryHistoryLog, InMemoryRegistryStore, MetadataRegistryService,
};
use cv_02_qr_transport::CaptureService;
use cv_03_payload_decoder::PayloadDecoderService;
use cv_04_signature_engine::{InMemorySeedSource, SignatureEngineService};
use cv_05_navigation::{Navigator, NavigatorDeps, QrFrameEncoder};
use shared_bus::{EventReceiver, InMemoryEventQueue, DEFAULT_CHANNEL_CAPACITY};
use shared_types::Verifier;
use std::sync::Arc;
use tracing::info;

/// Registry over in-memory storage.
pub type Registry = MetadataRegistryService<
    InMemoryRegistryStore,
    Arc<InMemoryHistoryLog>,
    DefaultSignatureChecker,
>;
/// Capture service publishing on the in-memory queue.
pub type Transport = CaptureService<InMemoryEventQueue>;
/// Decoder resolving against the registry.
pub type Decoder = PayloadDecoderService<RegistryLookup<Registry>>;
/// Signature engine over in-memory seeds.
pub type Signer = SignatureEngineService<Arc<InMemorySeedSource>>;

/// The vault's subsystems.
pub struct VaultContext {
    /// Validated configuration.
    pub config: VaultConfig,
    /// History shared by every subsystem that records events.
    pub history: Arc<InMemoryHistoryLog>,
    /// Metadata registry.
    pub registry: Arc<Registry>,
    /// Capture to control queue.
    pub events: Arc<InMemoryEventQueue>,
    /// Scan sessions.
    pub transport: Arc<Transport>,
    /// Payload decoder.
    pub decoder: Arc<Decoder>,
    /// Seed phrases. Populated by the host before keys are derived.
    pub seeds: Arc<InMemorySeedSource>,
    /// Signature engine.
    pub signer: Arc<Signer>,
    /// Navigation state machine.
    pub navigator: Arc<Navigator>,
}

impl VaultContext {
    /// Validate `config` and build every subsystem.
    pub fn new(config: VaultConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let history = Arc::new(InMemoryHistoryLog::new());
        let mut registry = Registry::in_memory(Arc::clone(&history));
        if let Some(signer) = &config.registry.general_verifier {
            registry = registry.with_general_verifier(Verifier::pinned(signer.clone()));
        }
        let registry = Arc::new(registry);

        let events = Arc::new(InMemoryEventQueue::with_capacity(DEFAULT_CHANNEL_CAPACITY));
        let transport = Arc::new(CaptureService::new(
            config.transport.clone(),
            Arc::clone(&events),
        ));

        let decoder = Arc::new(PayloadDecoderService::new(
            config.decoder.clone(),
            Arc::new(RegistryLookup::new(Arc::clone(&registry))),
        ));

        let seeds = Arc::new(InMemorySeedSource::new());
        let signer = Arc::new(SignatureEngineService::with_config(
            config.signing.clone(),
            Arc::clone(&seeds),
        ));

        let deps = NavigatorDeps {
            registry: registry.clone(),
            decoder: decoder.clone(),
            signer: signer.clone(),
            history: history.clone(),
            frames: Arc::new(QrFrameEncoder::new(config.transport.frame_capacity)),
        };
        let navigator = Arc::new(Navigator::new(deps, config.navigation.clone()));

        info!(
            max_sessions = config.transport.max_sessions,
            frame_capacity = config.transport.frame_capacity,
            blind_signing = config.decoder.allow_blind_signing,
            max_sign_attempts = config.navigation.max_sign_attempts,
            general_verifier = config.registry.general_verifier.is_some(),
            "Vault context built"
        );
        Ok(Self {
            config,
            history,
            registry,
            events,
            transport,
            decoder,
            seeds,
            signer,
            navigator,
        })
    }

    /// The single receiver of the event queue; `None` after the first call.
    pub fn take_events(&self) -> Option<EventReceiver> {
        self.events.take_receiver()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_01_metadata_registry::MetadataRegistryApi;
    use cv_05_navigation::{Action, NavigationApi, ScreenData};
    use shared_types::{Encryption, MultiSigner};

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = VaultConfig::default();
        config.transport.frame_capacity = 0;
        assert!(VaultContext::new(config).is_err());
    }

    #[test]
    fn test_general_verifier_reaches_registry() {
        let signer = MultiSigner::new(Encryption::Ed25519, vec![5; 32]).unwrap();
        let mut config = VaultConfig::default();
        config.registry.general_verifier = Some(signer.clone());
        let context = VaultContext::new(config).unwrap();
        assert_eq!(context.registry.general_verifier(), Verifier::pinned(signer));

        let plain = VaultContext::new(VaultConfig::default()).unwrap();
        assert_eq!(plain.registry.general_verifier(), Verifier::none());
    }

    #[test]
    fn test_subsystems_share_history() {
        let context = VaultContext::new(VaultConfig::default()).unwrap();
        context.seeds.add_seed("alice", "bottom drive obey lake");
        let result = context.navigator.perform(Action::SelectTab, "keys", None).unwrap();
        assert_eq!(
            result.screen_data,
            ScreenData::SeedSelector {
                seeds: vec!["alice".into()]
            }
        );
        assert!(context.history.is_empty());

        assert!(context.take_events().is_some());
        assert!(context.take_events().is_none());
    }
}
