//! Background execution gate.
//!
//! OS geofence callbacks can arrive before the application's background
//! context has booted. The gate holds those events in the queue until the
//! context acknowledges it is ready, then releases them in FIFO order.
//!
//! ```text
//!  NotStarted ──begin_start──▶ Starting ──mark_ready──▶ Ready
//!      ▲                          │
//!      └────────abort_start───────┘
//! ```

use crate::error::Result;
use crate::persistence::EventQueue;
use crate::types::TransitionEvent;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    NotStarted,
    Starting,
    Ready,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GateState::NotStarted => "not_started",
            GateState::Starting => "starting",
            GateState::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// What the gate did with an admitted event.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// The gate is open; deliver this event now.
    Deliver(TransitionEvent),
    /// The event was appended to the queue.
    Queued,
}

pub struct BackgroundGate {
    state: GateState,
    queue: Arc<dyn EventQueue>,
}

impl BackgroundGate {
    pub fn new(queue: Arc<dyn EventQueue>) -> Self {
        Self {
            state: GateState::NotStarted,
            queue,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == GateState::Ready
    }

    /// Moves `NotStarted -> Starting`. Returns false (and changes nothing)
    /// if the background context is already starting or ready.
    pub fn begin_start(&mut self) -> bool {
        if self.state != GateState::NotStarted {
            tracing::debug!(state = %self.state, "background start already requested");
            return false;
        }
        self.state = GateState::Starting;
        tracing::info!("background context starting");
        true
    }

    /// Returns to `NotStarted` after a failed launch so a later request can
    /// retry. Queued events are kept.
    pub fn abort_start(&mut self) {
        if self.state == GateState::Starting {
            self.state = GateState::NotStarted;
            tracing::warn!("background context launch aborted");
        }
    }

    /// Routes a transition: delivered directly once ready, queued before.
    pub fn admit(&mut self, event: TransitionEvent) -> Result<Admission> {
        if self.is_ready() {
            return Ok(Admission::Deliver(event));
        }
        self.queue.push(&event)?;
        tracing::debug!(
            region = %event.region_id(),
            event = %event.kind(),
            state = %self.state,
            "queued transition until background context is ready"
        );
        Ok(Admission::Queued)
    }

    /// Opens the gate and returns every queued event in FIFO order.
    ///
    /// Calling this when already ready returns nothing. If the drain fails
    /// the gate stays closed, so later events keep queueing behind the
    /// undrained ones and the next call retries.
    pub fn mark_ready(&mut self) -> Result<Vec<TransitionEvent>> {
        match self.state {
            GateState::Ready => return Ok(Vec::new()),
            GateState::NotStarted => {
                tracing::warn!("background context reported ready without a start request");
            }
            GateState::Starting => {}
        }

        let drained = self.queue.drain()?;
        self.state = GateState::Ready;
        tracing::info!(replayed = drained.len(), "background context ready");
        Ok(drained)
    }

    pub fn pending(&self) -> Result<usize> {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeofenceError;
    use crate::memory::MemoryQueue;
    use crate::types::{Coordinate, GeoEvent};

    fn event(id: &str, kind: GeoEvent) -> TransitionEvent {
        TransitionEvent::new(id, kind, 50.0, Coordinate::new(1.0, 1.0).unwrap(), 0)
    }

    fn gate() -> BackgroundGate {
        BackgroundGate::new(Arc::new(MemoryQueue::new()))
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut gate = gate();
        assert!(gate.begin_start());
        assert!(!gate.begin_start());
        assert_eq!(gate.state(), GateState::Starting);

        gate.mark_ready().unwrap();
        assert!(!gate.begin_start());
        assert_eq!(gate.state(), GateState::Ready);
    }

    #[test]
    fn test_events_queue_until_ready() {
        let mut gate = gate();
        assert_eq!(
            gate.admit(event("a", GeoEvent::Entry)).unwrap(),
            Admission::Queued
        );
        gate.begin_start();
        assert_eq!(
            gate.admit(event("a", GeoEvent::Exit)).unwrap(),
            Admission::Queued
        );
        assert_eq!(gate.pending().unwrap(), 2);

        let drained = gate.mark_ready().unwrap();
        let kinds: Vec<_> = drained.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![GeoEvent::Entry, GeoEvent::Exit]);
        assert_eq!(gate.pending().unwrap(), 0);
    }

    #[test]
    fn test_ready_gate_delivers_directly() {
        let mut gate = gate();
        gate.begin_start();
        gate.mark_ready().unwrap();

        let e = event("a", GeoEvent::Entry);
        assert_eq!(gate.admit(e.clone()).unwrap(), Admission::Deliver(e));
        assert_eq!(gate.pending().unwrap(), 0);
    }

    #[test]
    fn test_second_ready_drains_nothing() {
        let mut gate = gate();
        gate.begin_start();
        gate.admit(event("a", GeoEvent::Entry)).unwrap();
        assert_eq!(gate.mark_ready().unwrap().len(), 1);
        assert!(gate.mark_ready().unwrap().is_empty());
    }

    #[test]
    fn test_abort_keeps_queue() {
        let mut gate = gate();
        gate.begin_start();
        gate.admit(event("a", GeoEvent::Entry)).unwrap();
        gate.abort_start();

        assert_eq!(gate.state(), GateState::NotStarted);
        assert_eq!(gate.pending().unwrap(), 1);
        assert!(gate.begin_start());
    }

    /// Queue whose first drain fails without losing anything.
    #[derive(Default)]
    struct FailOnceQueue {
        inner: MemoryQueue,
        failed: std::sync::atomic::AtomicBool,
    }

    impl EventQueue for FailOnceQueue {
        fn push(&self, event: &TransitionEvent) -> Result<()> {
            self.inner.push(event)
        }

        fn drain(&self) -> Result<Vec<TransitionEvent>> {
            if !self.failed.swap(true, std::sync::atomic::Ordering::SeqCst) {
                return Err(GeofenceError::Storage("disk I/O error".into()));
            }
            self.inner.drain()
        }

        fn len(&self) -> Result<usize> {
            self.inner.len()
        }
    }

    #[test]
    fn test_failed_drain_keeps_gate_closed() {
        let mut gate = BackgroundGate::new(Arc::new(FailOnceQueue::default()));
        gate.begin_start();
        gate.admit(event("a", GeoEvent::Entry)).unwrap();

        assert!(gate.mark_ready().is_err());
        assert_eq!(gate.state(), GateState::Starting);

        assert_eq!(
            gate.admit(event("a", GeoEvent::Exit)).unwrap(),
            Admission::Queued
        );
        assert_eq!(gate.pending().unwrap(), 2);

        let kinds: Vec<_> = gate
            .mark_ready()
            .unwrap()
            .iter()
            .map(|e| e.kind())
            .collect();
        assert_eq!(kinds, vec![GeoEvent::Entry, GeoEvent::Exit]);
        assert!(gate.is_ready());
        assert_eq!(gate.pending().unwrap(), 0);
    }

    #[test]
    fn test_ready_without_start() {
        let mut gate = gate();
        gate.admit(event("a", GeoEvent::Exit)).unwrap();
        assert_eq!(gate.mark_ready().unwrap().len(), 1);
        assert!(gate.is_ready());
    }
}
