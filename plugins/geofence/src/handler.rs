//! OS-facing callbacks and the background delivery path.

use geofence_core::{
    Admission, CallbackHandles, Coordinate, GeoEvent, RegionState, TransitionEvent,
    KEY_CALLBACK_DISPATCHER_HANDLE, KEY_USER_CALLBACK_HANDLE,
};
use geofence_events::{event_names, GeofenceMessage, LocationUpdatedEvent};

use crate::state::State;
use crate::GeofencePlugin;

impl GeofencePlugin {
    /// Region-state callback from the geofencing adapter.
    pub async fn on_region_state(&self, region_id: &str, new_state: RegionState, at: Coordinate) {
        let mut state = self.state.lock().await;
        if let Some(event) = state.regions.resolve_transition(region_id, new_state, at) {
            self.route(&mut state, event);
        }
    }

    /// Transition callback for adapters that report ENTRY / EXIT directly.
    pub async fn on_transition(&self, region_id: &str, kind: GeoEvent, at: Coordinate) {
        self.on_region_state(region_id, kind.resulting_state(), at)
            .await;
    }

    /// One-shot or foreground location fix.
    pub fn on_user_location(&self, at: Coordinate) {
        self.emit_location(event_names::USER_LOCATION_UPDATED, at);
    }

    /// Periodic low-power location fix.
    pub fn on_background_location(&self, at: Coordinate) {
        self.emit_location(event_names::BACKGROUND_LOCATION_UPDATED, at);
    }

    /// Outcome of a permission dialog.
    pub async fn on_permission_result(&self, granted: bool) {
        let mut state = self.state.lock().await;
        state.authorized = granted;
        if granted {
            tracing::info!("location permission granted");
        } else {
            tracing::warn!("location permission denied");
        }
    }

    /// Relaunches the background context from the persisted dispatcher
    /// handle. Returns true if a launch was attempted and succeeded.
    pub async fn resume_background(&self) -> bool {
        let dispatcher = match self.handles.load_handle(KEY_CALLBACK_DISPATCHER_HANDLE) {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                tracing::info!("no dispatcher handle persisted, background resume skipped");
                return false;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load dispatcher handle");
                return false;
            }
        };

        let mut state = self.state.lock().await;
        if !state.gate.begin_start() {
            return false;
        }
        self.launch(&mut state, dispatcher).await
    }

    pub(crate) async fn initialize_background(&self, handles: CallbackHandles) {
        let mut state = self.state.lock().await;
        if !state.gate.begin_start() {
            return;
        }
        if let Err(e) = self.handles.save_callback_handles(&handles) {
            tracing::error!(error = %e, "failed to persist callback handles");
        }
        self.launch(&mut state, handles.dispatcher).await;
    }

    pub(crate) async fn background_ready(&self) {
        let mut state = self.state.lock().await;
        match state.gate.mark_ready() {
            Ok(events) => {
                for event in &events {
                    self.deliver(event);
                }
            }
            Err(e) => tracing::error!(
                error = %e,
                state = %state.gate.state(),
                "failed to drain queued transitions, gate stays closed"
            ),
        }
    }

    pub(crate) async fn get_user_location(&self) {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let max_age_ms = self.config.location_max_age().as_millis() as i64;

        match self.platform.location.last_known_location().await {
            Ok(Some(fix)) if fix.age_ms(now_ms) <= max_age_ms => {
                self.on_user_location(fix.coordinate);
                return;
            }
            Ok(Some(fix)) => {
                tracing::debug!(age_ms = fix.age_ms(now_ms), "last known location is stale");
            }
            Ok(None) => tracing::debug!("no last known location"),
            Err(e) => tracing::warn!(error = %e, "failed to read last known location"),
        }

        if let Err(e) = self.platform.location.request_location().await {
            tracing::error!(error = %e, "failed to request location");
        }
    }

    async fn launch(&self, state: &mut State, dispatcher: i64) -> bool {
        match self.platform.launcher.launch(dispatcher).await {
            Ok(()) => {
                tracing::info!(dispatcher, "background context launched");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to launch background context");
                state.gate.abort_start();
                false
            }
        }
    }

    fn route(&self, state: &mut State, event: TransitionEvent) {
        match state.gate.admit(event) {
            Ok(Admission::Deliver(event)) => self.deliver(&event),
            Ok(Admission::Queued) => {}
            Err(e) => tracing::error!(error = %e, "failed to queue transition"),
        }
    }

    fn deliver(&self, event: &TransitionEvent) {
        let message = GeofenceMessage::position(self.user_callback_handle(), event);
        match serde_json::to_value(&message) {
            Ok(payload) => {
                tracing::debug!(
                    region = %event.region_id(),
                    event = %event.kind(),
                    "delivering geofence message"
                );
                self.channels
                    .background
                    .emit(event_names::ON_GEOFENCE_MESSAGE, payload);
            }
            Err(e) => tracing::error!(error = %e, "failed to serialize geofence message"),
        }
    }

    fn user_callback_handle(&self) -> i64 {
        match self.handles.load_handle(KEY_USER_CALLBACK_HANDLE) {
            Ok(handle) => handle.unwrap_or(0),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load user callback handle");
                0
            }
        }
    }

    fn emit_location(&self, topic: &str, at: Coordinate) {
        match serde_json::to_value(LocationUpdatedEvent::from(at)) {
            Ok(payload) => self.channels.main.emit(topic, payload),
            Err(e) => tracing::error!(error = %e, "failed to serialize location update"),
        }
    }
}
