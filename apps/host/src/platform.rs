//! Platform services that only log what they are asked to do.

use async_trait::async_trait;
use geofence_core::{
    BackgroundLauncher, GeoRegion, GeofenceAdapter, LocationFix, LocationProvider,
    PermissionProvider, Result,
};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct LoggingPlatform;

#[async_trait]
impl GeofenceAdapter for LoggingPlatform {
    async fn start_monitoring(&self, region: &GeoRegion) -> Result<()> {
        tracing::info!(
            region = %region.id(),
            radius = region.radius(),
            lat = region.center().latitude,
            lng = region.center().longitude,
            "start monitoring"
        );
        Ok(())
    }

    async fn stop_monitoring(&self, region_id: &str) -> Result<()> {
        tracing::info!(region = %region_id, "stop monitoring");
        Ok(())
    }

    async fn stop_monitoring_all(&self) -> Result<()> {
        tracing::info!("stop monitoring all regions");
        Ok(())
    }
}

#[async_trait]
impl LocationProvider for LoggingPlatform {
    async fn last_known_location(&self) -> Result<Option<LocationFix>> {
        Ok(None)
    }

    async fn request_location(&self) -> Result<()> {
        tracing::info!("location requested");
        Ok(())
    }

    async fn start_periodic_updates(&self, interval: Duration) -> Result<()> {
        tracing::info!(interval_secs = interval.as_secs(), "periodic updates started");
        Ok(())
    }

    async fn stop_periodic_updates(&self) -> Result<()> {
        tracing::info!("periodic updates stopped");
        Ok(())
    }
}

#[async_trait]
impl PermissionProvider for LoggingPlatform {
    async fn is_authorized(&self) -> bool {
        false
    }

    async fn request_permissions(&self) -> Result<()> {
        tracing::info!("permission dialog requested");
        Ok(())
    }
}

#[async_trait]
impl BackgroundLauncher for LoggingPlatform {
    async fn launch(&self, entrypoint_handle: i64) -> Result<()> {
        tracing::info!(entrypoint_handle, "background context launch requested");
        Ok(())
    }
}
