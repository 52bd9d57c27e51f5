//! Outbound channel abstraction.
//!
//! The bridge pushes one-way notifications to the application layer through
//! an `EventBus`. The host decides how the payload bytes travel (a platform
//! method channel, stdout, a socket); the core only names the topic.

use std::sync::{Arc, Mutex};

/// One-way notification sink toward the application layer.
///
/// Implementations must not block: emission happens while the bridge holds
/// its state lock.
pub trait EventBus: Send + Sync {
    /// Emit `payload` under `topic` (e.g. "userLocationUpdated").
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

/// Type alias for shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// Event bus backed by a closure.
pub struct FnEventBus<F> {
    f: F,
}

impl<F> FnEventBus<F>
where
    F: Fn(&str, serde_json::Value) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventBus for FnEventBus<F>
where
    F: Fn(&str, serde_json::Value) + Send + Sync,
{
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        (self.f)(topic, payload)
    }
}

/// In-memory event bus for testing.
///
/// Captures all emitted events in emission order.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

/// A captured event from InMemoryEventBus.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EmittedEvent> {
        self.events.lock().expect("event bus mutex poisoned").clone()
    }

    /// Payloads emitted under `topic`, oldest first.
    pub fn payloads_for(&self, topic: &str) -> Vec<serde_json::Value> {
        self.events
            .lock()
            .expect("event bus mutex poisoned")
            .iter()
            .filter(|e| e.topic == topic)
            .map(|e| e.payload.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().expect("event bus mutex poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("event bus mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().expect("event bus mutex poisoned").is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.events.lock().expect("event bus mutex poisoned").push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}

/// No-op event bus that discards all events.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {}
}
