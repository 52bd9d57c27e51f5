//! Region bookkeeping.
//!
//! Tracks every monitored region with its last-known membership state and
//! decides which OS callbacks become transition events.

use crate::persistence::RegionRepository;
use crate::platform::GeofenceAdapter;
use crate::types::{Coordinate, GeoRegion, RegionState, TransitionEvent};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct TrackedRegion {
    region: GeoRegion,
    state: RegionState,
}

/// Monitored regions keyed by identifier.
///
/// Adapter and repository failures are logged and never undo the
/// in-memory change: the store reflects what the application asked for.
pub struct RegionStore {
    adapter: Arc<dyn GeofenceAdapter>,
    repository: Arc<dyn RegionRepository>,
    regions: HashMap<String, TrackedRegion>,
}

impl RegionStore {
    pub fn new(adapter: Arc<dyn GeofenceAdapter>, repository: Arc<dyn RegionRepository>) -> Self {
        Self {
            adapter,
            repository,
            regions: HashMap::new(),
        }
    }

    /// Builds a store pre-populated from the repository.
    ///
    /// Used after the OS relaunches the process: regions are still
    /// registered with the platform, so they are not registered again.
    pub fn restore(
        adapter: Arc<dyn GeofenceAdapter>,
        repository: Arc<dyn RegionRepository>,
    ) -> Self {
        let mut store = Self::new(adapter, repository);
        match store.repository.load_regions() {
            Ok(saved) => {
                for (region, state) in saved {
                    store
                        .regions
                        .insert(region.id().to_string(), TrackedRegion { region, state });
                }
                tracing::debug!(count = store.regions.len(), "restored monitored regions");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to restore monitored regions");
            }
        }
        store
    }

    /// Starts monitoring `region`, replacing any region with the same id
    /// and resetting its state to `Unknown`.
    pub async fn upsert(&mut self, region: GeoRegion) {
        let id = region.id().to_string();

        if let Err(e) = self.adapter.start_monitoring(&region).await {
            tracing::error!(region = %id, error = %e, "failed to register region");
        }
        if let Err(e) = self.repository.save_region(&region, RegionState::Unknown) {
            tracing::warn!(region = %id, error = %e, "failed to persist region");
        }

        tracing::info!(
            region = %id,
            radius = region.radius(),
            events = %region.events(),
            "monitoring region"
        );
        self.regions.insert(
            id,
            TrackedRegion {
                region,
                state: RegionState::Unknown,
            },
        );
    }

    /// Stops monitoring `id`. Returns false if it was not tracked.
    pub async fn remove(&mut self, id: &str) -> bool {
        if self.regions.remove(id).is_none() {
            tracing::debug!(region = %id, "remove requested for untracked region");
            return false;
        }

        if let Err(e) = self.adapter.stop_monitoring(id).await {
            tracing::error!(region = %id, error = %e, "failed to deregister region");
        }
        if let Err(e) = self.repository.delete_region(id) {
            tracing::warn!(region = %id, error = %e, "failed to delete persisted region");
        }
        tracing::info!(region = %id, "stopped monitoring region");
        true
    }

    /// Stops monitoring every region. Returns how many were tracked.
    ///
    /// The adapter is always asked to clear, even with nothing tracked, so
    /// registrations left behind by an earlier process are dropped too.
    pub async fn remove_all(&mut self) -> usize {
        let count = self.regions.len();
        self.regions.clear();

        if let Err(e) = self.adapter.stop_monitoring_all().await {
            tracing::error!(error = %e, "failed to deregister regions");
        }
        if let Err(e) = self.repository.clear_regions() {
            tracing::warn!(error = %e, "failed to clear persisted regions");
        }
        tracing::info!(count, "stopped monitoring all regions");
        count
    }

    /// Turns an OS membership report into a transition event.
    ///
    /// Returns `None` for unknown regions, `Unknown` reports, repeats of
    /// the last emitted state and directions the region is not subscribed
    /// to. State only advances when an event is returned, so two
    /// consecutive events for a region never share a kind.
    pub fn resolve_transition(
        &mut self,
        id: &str,
        new_state: RegionState,
        coordinate: Coordinate,
    ) -> Option<TransitionEvent> {
        let Some(tracked) = self.regions.get_mut(id) else {
            tracing::debug!(region = %id, "transition for untracked region ignored");
            return None;
        };

        let kind = new_state.transition_kind()?;

        if tracked.state == new_state {
            tracing::trace!(region = %id, state = %new_state, "duplicate transition suppressed");
            return None;
        }
        if !tracked.region.events().contains(kind) {
            tracing::trace!(region = %id, event = %kind, "unsubscribed transition suppressed");
            return None;
        }

        tracked.state = new_state;
        if let Err(e) = self.repository.save_region(&tracked.region, new_state) {
            tracing::warn!(region = %id, error = %e, "failed to persist region state");
        }

        Some(TransitionEvent::new(
            id,
            kind,
            tracked.region.radius(),
            coordinate,
            chrono::Utc::now().timestamp_millis(),
        ))
    }

    pub fn get(&self, id: &str) -> Option<&GeoRegion> {
        self.regions.get(id).map(|t| &t.region)
    }

    pub fn state(&self, id: &str) -> Option<RegionState> {
        self.regions.get(id).map(|t| t.state)
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.regions.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
