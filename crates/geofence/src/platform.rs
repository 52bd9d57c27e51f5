//! Traits for the platform location services.
//!
//! These abstract the OS geofencing, location and permission APIs so the
//! bookkeeping and gate logic stays testable without a device. Every call
//! is a future: the platform may complete it on another thread.

use crate::error::Result;
use crate::types::{Coordinate, GeoRegion};
use async_trait::async_trait;
use std::time::Duration;

/// A position reported by the platform together with when it was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub coordinate: Coordinate,
    /// Milliseconds since epoch.
    pub timestamp_ms: i64,
}

impl LocationFix {
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.timestamp_ms)
    }
}

/// Registers circular regions with the OS geofencing service.
#[async_trait]
pub trait GeofenceAdapter: Send + Sync {
    async fn start_monitoring(&self, region: &GeoRegion) -> Result<()>;

    async fn stop_monitoring(&self, region_id: &str) -> Result<()>;

    /// Deregisters every region this application registered, including
    /// ones left behind by an earlier process.
    async fn stop_monitoring_all(&self) -> Result<()>;
}

/// One-shot and periodic location updates.
///
/// Fixes requested here are delivered back through the plugin's
/// `on_user_location` / `on_background_location` callbacks.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn last_known_location(&self) -> Result<Option<LocationFix>>;

    async fn request_location(&self) -> Result<()>;

    async fn start_periodic_updates(&self, interval: Duration) -> Result<()>;

    async fn stop_periodic_updates(&self) -> Result<()>;
}

/// Location permission state and the platform permission dialog.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    async fn is_authorized(&self) -> bool;

    /// Shows the permission dialog. The outcome arrives later through
    /// `on_permission_result`.
    async fn request_permissions(&self) -> Result<()>;
}

/// Boots the application layer's background execution context.
#[async_trait]
pub trait BackgroundLauncher: Send + Sync {
    async fn launch(&self, entrypoint_handle: i64) -> Result<()>;
}

/// Null implementation for unsupported platforms.
///
/// Accepts every request and never reports a location or authorization.
pub struct NullPlatform;

#[async_trait]
impl GeofenceAdapter for NullPlatform {
    async fn start_monitoring(&self, _region: &GeoRegion) -> Result<()> {
        Ok(())
    }

    async fn stop_monitoring(&self, _region_id: &str) -> Result<()> {
        Ok(())
    }

    async fn stop_monitoring_all(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl LocationProvider for NullPlatform {
    async fn last_known_location(&self) -> Result<Option<LocationFix>> {
        Ok(None)
    }

    async fn request_location(&self) -> Result<()> {
        Ok(())
    }

    async fn start_periodic_updates(&self, _interval: Duration) -> Result<()> {
        Ok(())
    }

    async fn stop_periodic_updates(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl PermissionProvider for NullPlatform {
    async fn is_authorized(&self) -> bool {
        false
    }

    async fn request_permissions(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl BackgroundLauncher for NullPlatform {
    async fn launch(&self, _entrypoint_handle: i64) -> Result<()> {
        Ok(())
    }
}
