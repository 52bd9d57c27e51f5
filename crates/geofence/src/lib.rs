//! Geofence core: region bookkeeping and replay-on-ready delivery.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  types.rs  - GeoRegion, RegionState, TransitionEvent (pure)  │
//! │  codec.rs  - Byte encoding for regions                       │
//! │  store.rs  - Region bookkeeping and transition resolution    │
//! │  gate.rs   - NotStarted/Starting/Ready delivery gate         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Seams                                 │
//! │  platform.rs    - OS geofencing, location, permissions       │
//! │  persistence.rs - Handles, regions, event queue              │
//! │  memory.rs      - In-process persistence                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use geofence_core::{BackgroundGate, MemoryQueue, RegionStore, RegionState};
//!
//! let mut gate = BackgroundGate::new(Arc::new(MemoryQueue::new()));
//! if let Some(event) = store.resolve_transition("home", RegionState::Inside, here) {
//!     gate.admit(event)?;
//! }
//! ```

pub mod codec;
mod error;
mod gate;
mod memory;
mod persistence;
mod platform;
mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
mod types;

pub use codec::CodecError;
pub use error::{GeofenceError, Result};
pub use gate::{Admission, BackgroundGate, GateState};
pub use memory::{MemoryHandleStore, MemoryQueue, MemoryRegionRepository};
pub use persistence::{
    CallbackHandles, EventQueue, HandleStore, RegionRepository, KEY_CALLBACK_DISPATCHER_HANDLE,
    KEY_USER_CALLBACK_HANDLE,
};
pub use platform::{
    BackgroundLauncher, GeofenceAdapter, LocationFix, LocationProvider, NullPlatform,
    PermissionProvider,
};
pub use store::RegionStore;
pub use types::{
    Coordinate, EventSet, GeoEvent, GeoRegion, RegionError, RegionState, TransitionEvent,
    DEFAULT_RADIUS_METERS,
};
