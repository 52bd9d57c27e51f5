//! In-process implementations of the persistence traits.
//!
//! Nothing here survives a restart. Used when no database is configured
//! and throughout the tests.

use crate::error::Result;
use crate::persistence::{EventQueue, HandleStore, RegionRepository};
use crate::types::{GeoRegion, RegionState, TransitionEvent};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryHandleStore {
    handles: Mutex<HashMap<String, i64>>,
}

impl MemoryHandleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HandleStore for MemoryHandleStore {
    fn save_handle(&self, key: &str, handle: i64) -> Result<()> {
        self.handles
            .lock()
            .expect("store mutex poisoned")
            .insert(key.to_string(), handle);
        Ok(())
    }

    fn load_handle(&self, key: &str) -> Result<Option<i64>> {
        Ok(self.handles.lock().expect("store mutex poisoned").get(key).copied())
    }
}

/// Regions kept in insertion order so restores are deterministic.
#[derive(Default)]
pub struct MemoryRegionRepository {
    regions: Mutex<Vec<(GeoRegion, RegionState)>>,
}

impl MemoryRegionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegionRepository for MemoryRegionRepository {
    fn save_region(&self, region: &GeoRegion, state: RegionState) -> Result<()> {
        let mut regions = self.regions.lock().expect("store mutex poisoned");
        match regions.iter_mut().find(|(r, _)| r.id() == region.id()) {
            Some(entry) => *entry = (region.clone(), state),
            None => regions.push((region.clone(), state)),
        }
        Ok(())
    }

    fn delete_region(&self, id: &str) -> Result<()> {
        self.regions.lock().expect("store mutex poisoned").retain(|(r, _)| r.id() != id);
        Ok(())
    }

    fn clear_regions(&self) -> Result<()> {
        self.regions.lock().expect("store mutex poisoned").clear();
        Ok(())
    }

    fn load_regions(&self) -> Result<Vec<(GeoRegion, RegionState)>> {
        Ok(self.regions.lock().expect("store mutex poisoned").clone())
    }
}

#[derive(Default)]
pub struct MemoryQueue {
    events: Mutex<VecDeque<TransitionEvent>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventQueue for MemoryQueue {
    fn push(&self, event: &TransitionEvent) -> Result<()> {
        self.events.lock().expect("store mutex poisoned").push_back(event.clone());
        Ok(())
    }

    fn drain(&self) -> Result<Vec<TransitionEvent>> {
        let drained = std::mem::take(&mut *self.events.lock().expect("store mutex poisoned"));
        Ok(drained.into())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.events.lock().expect("store mutex poisoned").len())
    }
}
