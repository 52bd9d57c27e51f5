//! Message-passing bridge between an application layer and the OS
//! geofencing, location and permission services.
//!
//! `GeofencePlugin` is the context object: build it once, clone it into
//! whatever receives commands or OS callbacks.
//!
//! ```text
//! app ──invoke(method, args)──► GeofencePlugin ──► platform adapters
//!  ▲                                 │  ▲
//!  │  main bus: location updates     │  └── OS callbacks (on_region_state, ...)
//!  └─────────────────────────────────┤
//!     background bus: onGeofenceMessage (gated until the context is ready)
//! ```

use geofence_core::{
    BackgroundGate, BackgroundLauncher, EventQueue, GateState, GeofenceAdapter, HandleStore,
    LocationProvider, MemoryHandleStore, MemoryQueue, MemoryRegionRepository, NullPlatform,
    PermissionProvider, RegionRepository, RegionState, RegionStore,
};
use geofence_events::{EventBusRef, NullEventBus};
use geofence_storage::{Database, StorageError};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

mod commands;
mod config;
mod error;
mod handler;
mod state;

pub use commands::{methods, Command, RegionArgs};
pub use config::{ConfigError, GeofenceConfig};
pub use error::BridgeError;
pub use state::{SharedState, State};

/// OS services the bridge drives.
#[derive(Clone)]
pub struct Platform {
    pub geofencing: Arc<dyn GeofenceAdapter>,
    pub location: Arc<dyn LocationProvider>,
    pub permissions: Arc<dyn PermissionProvider>,
    pub launcher: Arc<dyn BackgroundLauncher>,
}

impl Platform {
    /// Uses one object for every service.
    pub fn from_shared<P>(platform: Arc<P>) -> Self
    where
        P: GeofenceAdapter
            + LocationProvider
            + PermissionProvider
            + BackgroundLauncher
            + 'static,
    {
        Self {
            geofencing: platform.clone(),
            location: platform.clone(),
            permissions: platform.clone(),
            launcher: platform,
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::from_shared(Arc::new(NullPlatform))
    }
}

/// Where handles, regions and queued events are kept.
#[derive(Clone)]
pub struct Persistence {
    pub handles: Arc<dyn HandleStore>,
    pub regions: Arc<dyn RegionRepository>,
    pub queue: Arc<dyn EventQueue>,
}

impl Persistence {
    pub fn in_memory() -> Self {
        Self {
            handles: Arc::new(MemoryHandleStore::new()),
            regions: Arc::new(MemoryRegionRepository::new()),
            queue: Arc::new(MemoryQueue::new()),
        }
    }

    /// Uses one object for every store.
    pub fn from_shared<D>(store: Arc<D>) -> Self
    where
        D: HandleStore + RegionRepository + EventQueue + 'static,
    {
        Self {
            handles: store.clone(),
            regions: store.clone(),
            queue: store,
        }
    }

    /// Opens the SQLite database at `path`.
    pub fn sqlite(path: &Path) -> Result<Self, StorageError> {
        let db = Database::open(path)?;
        Ok(Self::from_shared(Arc::new(db)))
    }
}

/// Outbound channels to the application layer.
#[derive(Clone)]
pub struct Channels {
    pub main: EventBusRef,
    pub background: EventBusRef,
}

impl Default for Channels {
    fn default() -> Self {
        Self {
            main: Arc::new(NullEventBus),
            background: Arc::new(NullEventBus),
        }
    }
}

#[derive(Default)]
pub struct Builder {
    config: GeofenceConfig,
    platform: Option<Platform>,
    persistence: Option<Persistence>,
    channels: Option<Channels>,
}

impl Builder {
    pub fn config(mut self, config: GeofenceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn persistence(mut self, persistence: Persistence) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn channels(mut self, channels: Channels) -> Self {
        self.channels = Some(channels);
        self
    }

    /// Builds the plugin, restoring any regions the repository remembers.
    pub fn build(self) -> GeofencePlugin {
        let platform = self.platform.unwrap_or_default();
        let persistence = self.persistence.unwrap_or_else(Persistence::in_memory);
        let channels = self.channels.unwrap_or_default();

        let regions = RegionStore::restore(platform.geofencing.clone(), persistence.regions);
        let gate = BackgroundGate::new(persistence.queue);

        GeofencePlugin {
            state: Arc::new(Mutex::new(State::new(regions, gate))),
            config: Arc::new(self.config),
            platform,
            handles: persistence.handles,
            channels,
        }
    }
}

#[derive(Clone)]
pub struct GeofencePlugin {
    pub(crate) state: SharedState,
    pub(crate) config: Arc<GeofenceConfig>,
    pub(crate) platform: Platform,
    pub(crate) handles: Arc<dyn HandleStore>,
    pub(crate) channels: Channels,
}

impl GeofencePlugin {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn config(&self) -> &GeofenceConfig {
        &self.config
    }

    /// Handles one bridge call. Successful calls acknowledge with `null`.
    pub async fn invoke(&self, method: &str, args: Value) -> Result<Value, BridgeError> {
        tracing::debug!(method, "bridge call");
        let command = Command::parse(method, args, self.config.default_radius_m)?;
        self.execute(method, command).await?;
        Ok(Value::Null)
    }

    async fn execute(&self, method: &str, command: Command) -> Result<(), BridgeError> {
        match command {
            Command::AddRegion(region) => {
                let mut state = self.state.lock().await;
                if !self.ensure_authorized(&mut state).await {
                    return self.deny(method);
                }
                state.regions.upsert(region).await;
            }
            Command::RemoveRegion(id) => {
                self.state.lock().await.regions.remove(&id).await;
            }
            Command::RemoveRegions => {
                self.state.lock().await.regions.remove_all().await;
            }
            Command::GetUserLocation => self.get_user_location().await,
            Command::StartListening => {
                let mut state = self.state.lock().await;
                if !self.ensure_authorized(&mut state).await {
                    return self.deny(method);
                }
                let interval = self.config.background_interval();
                match self.platform.location.start_periodic_updates(interval).await {
                    Ok(()) => {
                        state.listening = true;
                        tracing::info!(
                            interval_secs = interval.as_secs(),
                            "listening for location changes"
                        );
                    }
                    Err(e) => tracing::error!(error = %e, "failed to start location updates"),
                }
            }
            Command::StopListening => {
                let mut state = self.state.lock().await;
                if let Err(e) = self.platform.location.stop_periodic_updates().await {
                    tracing::error!(error = %e, "failed to stop location updates");
                }
                state.listening = false;
            }
            Command::RequestPermissions => {
                let mut state = self.state.lock().await;
                if self.platform.permissions.is_authorized().await {
                    state.authorized = true;
                    tracing::debug!("location permission already granted");
                } else if let Err(e) = self.platform.permissions.request_permissions().await {
                    tracing::error!(error = %e, "failed to request location permission");
                }
            }
            Command::InitializeBackground(handles) => self.initialize_background(handles).await,
            Command::BackgroundInitialized => self.background_ready().await,
        }
        Ok(())
    }

    /// Refreshes the cached flag from the provider when it is not set.
    async fn ensure_authorized(&self, state: &mut State) -> bool {
        if !state.authorized && self.platform.permissions.is_authorized().await {
            state.authorized = true;
        }
        state.authorized
    }

    fn deny(&self, method: &str) -> Result<(), BridgeError> {
        if self.config.strict_permissions {
            return Err(BridgeError::PermissionDenied(method.to_string()));
        }
        tracing::warn!(method, "location permission not granted, request ignored");
        Ok(())
    }

    pub async fn gate_state(&self) -> GateState {
        self.state.lock().await.gate.state()
    }

    /// Number of transitions waiting for the background context.
    pub async fn pending_events(&self) -> geofence_core::Result<usize> {
        self.state.lock().await.gate.pending()
    }

    pub async fn region_state(&self, id: &str) -> Option<RegionState> {
        self.state.lock().await.regions.state(id)
    }

    pub async fn monitored_regions(&self) -> Vec<String> {
        self.state.lock().await.regions.ids()
    }

    pub async fn is_authorized(&self) -> bool {
        self.state.lock().await.authorized
    }

    pub async fn is_listening(&self) -> bool {
        self.state.lock().await.listening
    }
}
