//! Outbound message contracts for the geofence bridge.
//!
//! Defines the payloads the bridge sends to the application layer. Using
//! shared types keeps field names in one place.
//!
//! Also provides the `EventBus` trait for decoupled event emission.

mod bus;

pub use bus::{EmittedEvent, EventBus, EventBusRef, FnEventBus, InMemoryEventBus, NullEventBus};

use geofence_core::{Coordinate, GeoEvent, TransitionEvent};
use serde::{Deserialize, Serialize};

/// Message-type tag for a geofence position event.
pub const MESSAGE_TYPE_POSITION: i32 = 0;

/// A location fix pushed to the application layer.
///
/// Producers: location provider callbacks
/// Consumers: main channel (`userLocationUpdated`, `backgroundLocationUpdated`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdatedEvent {
    pub lat: f64,
    pub lng: f64,
}

impl From<Coordinate> for LocationUpdatedEvent {
    fn from(c: Coordinate) -> Self {
        Self {
            lat: c.latitude,
            lng: c.longitude,
        }
    }
}

/// Region description carried inside a geofence message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPayload {
    pub id: String,
    pub radius: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub event: GeoEvent,
}

impl From<&TransitionEvent> for RegionPayload {
    fn from(event: &TransitionEvent) -> Self {
        let at = event.coordinate();
        Self {
            id: event.region_id().to_string(),
            radius: event.radius(),
            latitude: at.latitude,
            longitude: at.longitude,
            event: event.kind(),
        }
    }
}

/// Envelope delivered to the background execution context.
///
/// Producers: bridge (gate drain or direct delivery)
/// Consumers: background channel (`onGeofenceMessage`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceMessage {
    #[serde(rename = "type")]
    pub message_type: i32,
    pub geofence_user_callback_handle: i64,
    pub geo_region: RegionPayload,
}

impl GeofenceMessage {
    pub fn position(user_callback_handle: i64, event: &TransitionEvent) -> Self {
        Self {
            message_type: MESSAGE_TYPE_POSITION,
            geofence_user_callback_handle: user_callback_handle,
            geo_region: RegionPayload::from(event),
        }
    }
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// One-shot or foreground location fix.
    pub const USER_LOCATION_UPDATED: &str = "userLocationUpdated";
    /// Periodic low-power location fix.
    pub const BACKGROUND_LOCATION_UPDATED: &str = "backgroundLocationUpdated";
    /// Geofence transition delivered to the background context.
    pub const ON_GEOFENCE_MESSAGE: &str = "onGeofenceMessage";
}
