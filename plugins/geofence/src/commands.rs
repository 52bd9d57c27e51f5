use geofence_core::{CallbackHandles, Coordinate, EventSet, GeoRegion, RegionError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{BridgeError, Result};

/// Method names accepted on the command channel.
pub mod methods {
    pub const ADD_REGION: &str = "addRegion";
    pub const REMOVE_REGION: &str = "removeRegion";
    pub const REMOVE_REGIONS: &str = "removeRegions";
    pub const GET_USER_LOCATION: &str = "getUserLocation";
    pub const START_LISTENING: &str = "startListeningForLocationChanges";
    pub const STOP_LISTENING: &str = "stopListeningForLocationChanges";
    pub const REQUEST_PERMISSIONS: &str = "requestPermissions";
    pub const INITIALIZE_BACKGROUND: &str = "initializeBackground";
    pub const BACKGROUND_INITIALIZED: &str = "backgroundInitializedAck";

    pub const LEGACY_START_BACKGROUND_ISOLATE: &str = "Geofence#startBackgroundIsolate";
    pub const LEGACY_BACKGROUND_INITIALIZED: &str = "GeofenceBackground#initialized";
}

/// Arguments of `addRegion` and `removeRegion`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionArgs {
    pub id: String,
    #[serde(default)]
    pub radius: Option<f64>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub event: Option<String>,
}

impl RegionArgs {
    pub fn into_region(self, default_radius: f64) -> std::result::Result<GeoRegion, RegionError> {
        let center = Coordinate::new(self.lat, self.lng)?;
        let events = match self.event.as_deref() {
            Some(selector) => EventSet::from_selector(selector),
            None => EventSet::BOTH,
        };
        GeoRegion::new(
            self.id,
            self.radius.unwrap_or(default_radius),
            center,
            events,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitializeArgs {
    plugin_callback_handle: i64,
    geofence_user_callback_handle: i64,
}

/// A decoded bridge call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddRegion(GeoRegion),
    RemoveRegion(String),
    RemoveRegions,
    GetUserLocation,
    StartListening,
    StopListening,
    RequestPermissions,
    InitializeBackground(CallbackHandles),
    BackgroundInitialized,
}

impl Command {
    /// Decodes `method` and its arguments. Argument-less commands ignore
    /// whatever they are given.
    pub fn parse(method: &str, args: Value, default_radius: f64) -> Result<Self> {
        use methods::*;

        let command = match method {
            ADD_REGION => {
                let region = parse_args::<RegionArgs>(method, args)?
                    .into_region(default_radius)
                    .map_err(|e| BridgeError::invalid(method, e))?;
                Command::AddRegion(region)
            }
            REMOVE_REGION => {
                let region = parse_args::<RegionArgs>(method, args)?
                    .into_region(default_radius)
                    .map_err(|e| BridgeError::invalid(method, e))?;
                Command::RemoveRegion(region.id().to_string())
            }
            REMOVE_REGIONS => Command::RemoveRegions,
            GET_USER_LOCATION => Command::GetUserLocation,
            START_LISTENING => Command::StartListening,
            STOP_LISTENING => Command::StopListening,
            REQUEST_PERMISSIONS => Command::RequestPermissions,
            INITIALIZE_BACKGROUND | LEGACY_START_BACKGROUND_ISOLATE => {
                let args = parse_args::<InitializeArgs>(method, args)?;
                Command::InitializeBackground(CallbackHandles {
                    dispatcher: args.plugin_callback_handle,
                    user_callback: args.geofence_user_callback_handle,
                })
            }
            BACKGROUND_INITIALIZED | LEGACY_BACKGROUND_INITIALIZED => {
                Command::BackgroundInitialized
            }
            other => return Err(BridgeError::NotImplemented(other.to_string())),
        };
        Ok(command)
    }
}

fn parse_args<T: DeserializeOwned>(method: &str, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| BridgeError::invalid(method, e))
}
