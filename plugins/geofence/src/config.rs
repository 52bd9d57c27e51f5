//! Bridge configuration.

use geofence_core::DEFAULT_RADIUS_METERS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DATABASE_FILE: &str = "geofence.db";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeofenceConfig {
    /// Radius in meters applied when `addRegion` omits one.
    pub default_radius_m: f64,
    /// A last-known fix older than this is refreshed before reporting.
    pub location_max_age_secs: u64,
    /// Interval requested for periodic background location updates.
    pub background_interval_secs: u64,
    /// Reject monitoring requests without authorization instead of
    /// acknowledging them silently.
    pub strict_permissions: bool,
    /// SQLite file for handles, regions and queued events.
    pub database_path: Option<PathBuf>,
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            default_radius_m: DEFAULT_RADIUS_METERS,
            location_max_age_secs: 60,
            background_interval_secs: 900, // 15 minutes
            strict_permissions: false,
            database_path: None,
        }
    }
}

impl GeofenceConfig {
    /// Loads and validates a JSON config file. Missing keys take defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_radius_m.is_finite() || self.default_radius_m <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "default_radius_m must be positive, got {}",
                self.default_radius_m
            )));
        }
        if self.background_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "background_interval_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Configured database path, or `<data dir>/geofence/geofence.db`.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database_path {
            return path.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("geofence")
            .join(DATABASE_FILE)
    }

    pub fn location_max_age(&self) -> Duration {
        Duration::from_secs(self.location_max_age_secs)
    }

    pub fn background_interval(&self) -> Duration {
        Duration::from_secs(self.background_interval_secs)
    }
}
