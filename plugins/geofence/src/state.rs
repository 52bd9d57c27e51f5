use geofence_core::{BackgroundGate, RegionStore};
use std::sync::Arc;
use tokio::sync::Mutex;

pub type SharedState = Arc<Mutex<State>>;

/// Everything geofence callbacks and commands must observe consistently.
pub struct State {
    pub(crate) regions: RegionStore,
    pub(crate) gate: BackgroundGate,
    pub(crate) authorized: bool,
    pub(crate) listening: bool,
}

impl State {
    pub(crate) fn new(regions: RegionStore, gate: BackgroundGate) -> Self {
        Self {
            regions,
            gate,
            authorized: false,
            listening: false,
        }
    }
}
