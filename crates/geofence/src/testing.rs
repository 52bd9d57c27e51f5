//! Recording platform double.
//!
//! Captures every platform call for later inspection, like
//! `InMemoryEventBus` does for emitted events.

use crate::error::{GeofenceError, Result};
use crate::platform::{
    BackgroundLauncher, GeofenceAdapter, LocationFix, LocationProvider, PermissionProvider,
};
use crate::types::GeoRegion;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A platform call captured by `FakePlatform`.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    StartMonitoring(String),
    StopMonitoring(String),
    StopMonitoringAll,
    LastKnownLocation,
    RequestLocation,
    StartPeriodicUpdates(Duration),
    StopPeriodicUpdates,
    RequestPermissions,
    Launch(i64),
}

#[derive(Default)]
pub struct FakePlatform {
    calls: Mutex<Vec<PlatformCall>>,
    authorized: AtomicBool,
    fail_monitoring: AtomicBool,
    fail_launch: AtomicBool,
    last_fix: Mutex<Option<LocationFix>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authorized() -> Self {
        let platform = Self::default();
        platform.set_authorized(true);
        platform
    }

    pub fn set_authorized(&self, authorized: bool) {
        self.authorized.store(authorized, Ordering::SeqCst);
    }

    pub fn fail_monitoring(&self, fail: bool) {
        self.fail_monitoring.store(fail, Ordering::SeqCst);
    }

    pub fn fail_launch(&self, fail: bool) {
        self.fail_launch.store(fail, Ordering::SeqCst);
    }

    pub fn set_last_fix(&self, fix: Option<LocationFix>) {
        *self.last_fix.lock().expect("platform mutex poisoned") = fix;
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().expect("platform mutex poisoned").clone()
    }

    /// Number of `launch` calls seen so far.
    pub fn launches(&self) -> usize {
        self.calls
            .lock()
            .expect("platform mutex poisoned")
            .iter()
            .filter(|c| matches!(c, PlatformCall::Launch(_)))
            .count()
    }

    pub fn clear(&self) {
        self.calls.lock().expect("platform mutex poisoned").clear();
    }

    fn record(&self, call: PlatformCall) {
        self.calls.lock().expect("platform mutex poisoned").push(call);
    }
}

#[async_trait]
impl GeofenceAdapter for FakePlatform {
    async fn start_monitoring(&self, region: &GeoRegion) -> Result<()> {
        self.record(PlatformCall::StartMonitoring(region.id().to_string()));
        if self.fail_monitoring.load(Ordering::SeqCst) {
            return Err(GeofenceError::Adapter("monitoring unavailable".into()));
        }
        Ok(())
    }

    async fn stop_monitoring(&self, region_id: &str) -> Result<()> {
        self.record(PlatformCall::StopMonitoring(region_id.to_string()));
        Ok(())
    }

    async fn stop_monitoring_all(&self) -> Result<()> {
        self.record(PlatformCall::StopMonitoringAll);
        Ok(())
    }
}

#[async_trait]
impl LocationProvider for FakePlatform {
    async fn last_known_location(&self) -> Result<Option<LocationFix>> {
        self.record(PlatformCall::LastKnownLocation);
        Ok(*self.last_fix.lock().expect("platform mutex poisoned"))
    }

    async fn request_location(&self) -> Result<()> {
        self.record(PlatformCall::RequestLocation);
        Ok(())
    }

    async fn start_periodic_updates(&self, interval: Duration) -> Result<()> {
        self.record(PlatformCall::StartPeriodicUpdates(interval));
        Ok(())
    }

    async fn stop_periodic_updates(&self) -> Result<()> {
        self.record(PlatformCall::StopPeriodicUpdates);
        Ok(())
    }
}

#[async_trait]
impl PermissionProvider for FakePlatform {
    async fn is_authorized(&self) -> bool {
        self.authorized.load(Ordering::SeqCst)
    }

    async fn request_permissions(&self) -> Result<()> {
        self.record(PlatformCall::RequestPermissions);
        Ok(())
    }
}

#[async_trait]
impl BackgroundLauncher for FakePlatform {
    async fn launch(&self, entrypoint_handle: i64) -> Result<()> {
        self.record(PlatformCall::Launch(entrypoint_handle));
        if self.fail_launch.load(Ordering::SeqCst) {
            return Err(GeofenceError::Adapter(format!(
                "no callback registered for handle {entrypoint_handle}"
            )));
        }
        Ok(())
    }
}
