// Runtime wiring for a plugin instance.

use crate::domain::ports::{EngineDefaults, PermissionOracle, TimerScheduler};
use crate::domain::tier::{Namespace, TimerProfile};
use crate::frameworks::config::{self, ConfigError, ConfigStore};
use crate::use_cases::plugin::{plugin_task, register_permissions};
use crate::use_cases::resolver::TierResolver;
use crate::use_cases::types::PluginEvent;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Notify};
use tracing::info;

/// Initializes env loading, tracing, and the panic hook.
///
/// Call once per process before starting a host. Embedders that own
/// their own subscriber can skip this.
pub fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Identity and wiring parameters for one plugin instance.
#[derive(Debug, Clone)]
pub struct PluginSettings {
    /// Permission namespace, also the config file stem.
    pub namespace: Namespace,
    /// Running plugin version; older stored configs are replaced.
    pub version: String,
    /// Location of the config document.
    pub config_path: PathBuf,
    /// Capacity for inbound plugin events.
    pub event_channel_capacity: usize,
}

impl PluginSettings {
    pub fn new(namespace: Namespace, version: &str) -> Self {
        let config_path = config::default_config_path(&namespace);
        Self {
            namespace,
            version: version.to_string(),
            config_path,
            event_channel_capacity: config::EVENT_CHANNEL_CAPACITY,
        }
    }

    /// Settings for the dual-duration (demolish + rotation) plugin.
    pub fn extended_hammer() -> Self {
        Self::new(Namespace::new("extendedhammer"), "2.0.0")
    }

    /// Settings for the single-duration (demolish only) plugin.
    pub fn extended_demolish() -> Self {
        Self::new(Namespace::new("extendeddemolish"), "1.0.0")
    }
}

/// A running plugin: config loaded, permissions registered, event task
/// spawned.
///
/// Owns no ambient globals; the host game composes one of these per
/// plugin and drops it (after `shutdown`) on unload.
pub struct PluginHost<P: TimerProfile> {
    settings: PluginSettings,
    oracle: Arc<dyn PermissionOracle>,
    resolver_tx: watch::Sender<Arc<TierResolver<P>>>,
    events_tx: mpsc::Sender<PluginEvent>,
    shutdown: Arc<Notify>,
}

impl<P> PluginHost<P>
where
    P: TimerProfile + Serialize + DeserializeOwned,
{
    /// Loads configuration, registers the derived permissions, and
    /// spawns the event loop. Must be called from within a tokio
    /// runtime.
    pub fn start(
        settings: PluginSettings,
        oracle: Arc<dyn PermissionOracle>,
        defaults: Arc<dyn EngineDefaults>,
        scheduler: Arc<dyn TimerScheduler>,
    ) -> Result<Self, ConfigError> {
        let store = ConfigStore::new(&settings.config_path, &settings.version);
        let table = store.load::<P>()?;
        let resolver = Arc::new(TierResolver::new(settings.namespace.clone(), table));

        // Permissions must be registered before any event is served.
        register_permissions(resolver.as_ref(), oracle.as_ref());
        info!(
            namespace = settings.namespace.as_str(),
            tiers = resolver.table().len(),
            config = %settings.config_path.display(),
            "plugin initialized"
        );

        let (resolver_tx, resolver_rx) = watch::channel(resolver);
        let (events_tx, events_rx) = mpsc::channel(settings.event_channel_capacity);
        let shutdown = Arc::new(Notify::new());

        tokio::spawn(plugin_task(
            events_rx,
            resolver_rx,
            Arc::clone(&oracle),
            defaults,
            scheduler,
            Arc::clone(&shutdown),
        ));

        Ok(Self {
            settings,
            oracle,
            resolver_tx,
            events_tx,
            shutdown,
        })
    }

    /// Sender the host's event hooks feed.
    pub fn events(&self) -> mpsc::Sender<PluginEvent> {
        self.events_tx.clone()
    }

    /// Snapshot of the currently published resolver.
    pub fn resolver(&self) -> Arc<TierResolver<P>> {
        self.resolver_tx.borrow().clone()
    }

    /// Re-reads the config document and publishes a fresh resolver.
    ///
    /// Builds the new table and resolver fully, registers any newly
    /// derived permissions, then swaps the resolver in one step. Events
    /// mid-flight keep the resolver they already borrowed.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let store = ConfigStore::new(&self.settings.config_path, &self.settings.version);
        let table = store.load::<P>()?;
        let resolver = Arc::new(TierResolver::new(self.settings.namespace.clone(), table));

        register_permissions(resolver.as_ref(), self.oracle.as_ref());
        info!(
            namespace = self.settings.namespace.as_str(),
            tiers = resolver.table().len(),
            "plugin configuration reloaded"
        );

        let _ = self.resolver_tx.send(resolver);
        Ok(())
    }

    /// Stops the event loop. Safe to call more than once.
    pub fn shutdown(&self) {
        // notify_one stores a permit, so the signal is not lost even if
        // the event task has not reached its select yet.
        self.shutdown.notify_one();
        info!(
            namespace = self.settings.namespace.as_str(),
            "plugin shut down"
        );
    }
}
