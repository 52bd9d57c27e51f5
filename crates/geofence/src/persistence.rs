//! Persistence seams.
//!
//! The OS may relaunch the process solely to deliver a geofence event, so
//! callback handles, monitored regions and undelivered events all live
//! behind these traits. `geofence-storage` implements them on SQLite;
//! `crate::memory` provides in-process versions.

use crate::error::Result;
use crate::types::{GeoRegion, RegionState, TransitionEvent};

/// Key for the background entrypoint (callback dispatcher) handle.
pub const KEY_CALLBACK_DISPATCHER_HANDLE: &str = "callback_dispatcher_handle";

/// Key for the application's geofence event callback handle.
pub const KEY_USER_CALLBACK_HANDLE: &str = "geofence_user_callback_handle";

/// Opaque handles supplied by the application layer when it initializes
/// background delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackHandles {
    /// Entrypoint used to boot the background execution context.
    pub dispatcher: i64,
    /// Handle echoed back in every geofence message.
    pub user_callback: i64,
}

/// Key-value store for opaque 64-bit handles.
pub trait HandleStore: Send + Sync {
    fn save_handle(&self, key: &str, handle: i64) -> Result<()>;

    fn load_handle(&self, key: &str) -> Result<Option<i64>>;

    fn save_callback_handles(&self, handles: &CallbackHandles) -> Result<()> {
        self.save_handle(KEY_CALLBACK_DISPATCHER_HANDLE, handles.dispatcher)?;
        self.save_handle(KEY_USER_CALLBACK_HANDLE, handles.user_callback)
    }
}

/// Durable record of monitored regions and their last-known state.
pub trait RegionRepository: Send + Sync {
    fn save_region(&self, region: &GeoRegion, state: RegionState) -> Result<()>;

    fn delete_region(&self, id: &str) -> Result<()>;

    fn clear_regions(&self) -> Result<()>;

    fn load_regions(&self) -> Result<Vec<(GeoRegion, RegionState)>>;
}

/// Ordered queue of transition events awaiting delivery.
pub trait EventQueue: Send + Sync {
    fn push(&self, event: &TransitionEvent) -> Result<()>;

    /// Removes and returns every queued event in FIFO order.
    ///
    /// The snapshot and the clear happen atomically: an event is either in
    /// the returned batch or still queued, never both and never neither.
    fn drain(&self) -> Result<Vec<TransitionEvent>>;

    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
