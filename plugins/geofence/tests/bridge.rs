//! End-to-end tests for the bridge: commands in, OS callbacks in, messages
//! out on the main and background channels.

use geofence_core::testing::{FakePlatform, PlatformCall};
use geofence_core::{Coordinate, GateState, GeoEvent, LocationFix, RegionState};
use geofence_events::{event_names, InMemoryEventBus};
use geofence_plugin::{
    BridgeError, Channels, GeofenceConfig, GeofencePlugin, Persistence, Platform,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

struct Harness {
    plugin: GeofencePlugin,
    platform: Arc<FakePlatform>,
    main: Arc<InMemoryEventBus>,
    background: Arc<InMemoryEventBus>,
}

fn harness_with(
    config: GeofenceConfig,
    platform: FakePlatform,
    persistence: Persistence,
) -> Harness {
    let platform = Arc::new(platform);
    let main = Arc::new(InMemoryEventBus::new());
    let background = Arc::new(InMemoryEventBus::new());

    let plugin = GeofencePlugin::builder()
        .config(config)
        .platform(Platform::from_shared(platform.clone()))
        .persistence(persistence)
        .channels(Channels {
            main: main.clone(),
            background: background.clone(),
        })
        .build();

    Harness {
        plugin,
        platform,
        main,
        background,
    }
}

fn harness() -> Harness {
    harness_with(
        GeofenceConfig::default(),
        FakePlatform::authorized(),
        Persistence::in_memory(),
    )
}

fn here() -> Coordinate {
    Coordinate::new(1.0, 2.0).unwrap()
}

fn region_args(id: &str) -> Value {
    json!({"id": id, "radius": 100.0, "lat": 1.0, "lng": 2.0})
}

fn init_args() -> Value {
    json!({"pluginCallbackHandle": 11, "geofenceUserCallbackHandle": 22})
}

/// (region id, event, user handle) of every delivered geofence message.
fn delivered(bus: &InMemoryEventBus) -> Vec<(String, String, i64)> {
    bus.payloads_for(event_names::ON_GEOFENCE_MESSAGE)
        .iter()
        .map(|p| {
            (
                p["geoRegion"]["id"].as_str().unwrap().to_string(),
                p["geoRegion"]["event"].as_str().unwrap().to_string(),
                p["geofenceUserCallbackHandle"].as_i64().unwrap(),
            )
        })
        .collect()
}

fn entry(id: &str, handle: i64) -> (String, String, i64) {
    (id.to_string(), "entry".to_string(), handle)
}

fn exit(id: &str, handle: i64) -> (String, String, i64) {
    (id.to_string(), "exit".to_string(), handle)
}

// =============================================================================
// Background gate
// =============================================================================

mod gate {
    use super::*;

    #[tokio::test]
    async fn test_queued_events_replay_in_order_on_ready() {
        let h = harness();
        h.plugin.invoke("addRegion", region_args("A")).await.unwrap();
        h.plugin.invoke("initializeBackground", init_args()).await.unwrap();
        assert_eq!(h.plugin.gate_state().await, GateState::Starting);

        h.plugin.on_transition("A", GeoEvent::Entry, here()).await;
        h.plugin.on_transition("A", GeoEvent::Exit, here()).await;
        assert_eq!(h.plugin.pending_events().await.unwrap(), 2);
        assert!(h.background.is_empty());

        h.plugin
            .invoke("backgroundInitializedAck", Value::Null)
            .await
            .unwrap();

        assert_eq!(h.plugin.gate_state().await, GateState::Ready);
        assert_eq!(h.plugin.pending_events().await.unwrap(), 0);
        assert_eq!(delivered(&h.background), vec![entry("A", 22), exit("A", 22)]);
    }

    #[tokio::test]
    async fn test_events_bypass_queue_after_ready() {
        let h = harness();
        h.plugin.invoke("addRegion", region_args("A")).await.unwrap();
        h.plugin.invoke("initializeBackground", init_args()).await.unwrap();
        h.plugin
            .invoke("backgroundInitializedAck", Value::Null)
            .await
            .unwrap();

        h.plugin.on_transition("A", GeoEvent::Entry, here()).await;

        assert_eq!(h.plugin.pending_events().await.unwrap(), 0);
        assert_eq!(delivered(&h.background), vec![entry("A", 22)]);
    }

    #[tokio::test]
    async fn test_message_payload_shape() {
        let h = harness();
        h.plugin.invoke("addRegion", region_args("A")).await.unwrap();
        h.plugin.invoke("initializeBackground", init_args()).await.unwrap();
        h.plugin
            .invoke("backgroundInitializedAck", Value::Null)
            .await
            .unwrap();
        h.plugin
            .on_region_state("A", RegionState::Outside, Coordinate::new(3.0, 4.0).unwrap())
            .await;

        let payloads = h.background.payloads_for(event_names::ON_GEOFENCE_MESSAGE);
        assert_eq!(
            payloads,
            vec![json!({
                "type": 0,
                "geofenceUserCallbackHandle": 22,
                "geoRegion": {
                    "id": "A",
                    "radius": 100.0,
                    "latitude": 3.0,
                    "longitude": 4.0,
                    "event": "exit"
                }
            })]
        );
    }

    #[tokio::test]
    async fn test_duplicate_transitions_are_suppressed() {
        let h = harness();
        h.plugin.invoke("addRegion", region_args("A")).await.unwrap();

        h.plugin.on_transition("A", GeoEvent::Entry, here()).await;
        h.plugin.on_transition("A", GeoEvent::Entry, here()).await;
        h.plugin
            .on_region_state("A", RegionState::Unknown, here())
            .await;
        h.plugin.on_transition("A", GeoEvent::Entry, here()).await;

        assert_eq!(h.plugin.pending_events().await.unwrap(), 1);
        assert_eq!(h.plugin.region_state("A").await, Some(RegionState::Inside));
    }

    #[tokio::test]
    async fn test_reinitialize_is_noop() {
        let h = harness();
        h.plugin.invoke("initializeBackground", init_args()).await.unwrap();
        h.plugin
            .invoke(
                "Geofence#startBackgroundIsolate",
                json!({"pluginCallbackHandle": 99, "geofenceUserCallbackHandle": 98}),
            )
            .await
            .unwrap();
        assert_eq!(h.platform.launches(), 1);

        h.plugin
            .invoke("GeofenceBackground#initialized", Value::Null)
            .await
            .unwrap();
        h.plugin.invoke("initializeBackground", init_args()).await.unwrap();
        assert_eq!(h.platform.launches(), 1);
        assert_eq!(h.plugin.gate_state().await, GateState::Ready);

        h.plugin.invoke("addRegion", region_args("A")).await.unwrap();
        h.plugin.on_transition("A", GeoEvent::Entry, here()).await;
        assert_eq!(delivered(&h.background), vec![entry("A", 22)]);
    }

    #[tokio::test]
    async fn test_failed_launch_allows_retry() {
        let h = harness();
        h.platform.fail_launch(true);
        h.plugin.invoke("addRegion", region_args("A")).await.unwrap();
        h.plugin.on_transition("A", GeoEvent::Entry, here()).await;

        h.plugin.invoke("initializeBackground", init_args()).await.unwrap();
        assert_eq!(h.plugin.gate_state().await, GateState::NotStarted);
        assert_eq!(h.plugin.pending_events().await.unwrap(), 1);

        h.platform.fail_launch(false);
        h.plugin.invoke("initializeBackground", init_args()).await.unwrap();
        assert_eq!(h.plugin.gate_state().await, GateState::Starting);
        assert_eq!(h.platform.launches(), 2);

        h.plugin
            .invoke("backgroundInitializedAck", Value::Null)
            .await
            .unwrap();
        assert_eq!(delivered(&h.background), vec![entry("A", 22)]);
    }

    #[tokio::test]
    async fn test_ack_without_initialize_uses_zero_handle() {
        let h = harness();
        h.plugin.invoke("addRegion", region_args("A")).await.unwrap();
        h.plugin.on_transition("A", GeoEvent::Exit, here()).await;

        h.plugin
            .invoke("backgroundInitializedAck", Value::Null)
            .await
            .unwrap();

        assert_eq!(h.platform.launches(), 0);
        assert_eq!(delivered(&h.background), vec![exit("A", 0)]);
    }

    #[tokio::test]
    async fn test_second_ack_replays_nothing() {
        let h = harness();
        h.plugin.invoke("addRegion", region_args("A")).await.unwrap();
        h.plugin.on_transition("A", GeoEvent::Entry, here()).await;
        h.plugin
            .invoke("backgroundInitializedAck", Value::Null)
            .await
            .unwrap();
        h.plugin
            .invoke("backgroundInitializedAck", Value::Null)
            .await
            .unwrap();

        assert_eq!(delivered(&h.background).len(), 1);
    }
}

// =============================================================================
// Region commands
// =============================================================================

mod regions {
    use super::*;

    #[tokio::test]
    async fn test_default_radius_and_entry_only() {
        let h = harness();
        h.plugin
            .invoke(
                "addRegion",
                json!({"id": "B", "lat": 0.0, "lng": 0.0, "radius": null, "event": "entry"}),
            )
            .await
            .unwrap();

        h.plugin.on_transition("B", GeoEvent::Exit, here()).await;
        assert_eq!(h.plugin.pending_events().await.unwrap(), 0);

        h.plugin.on_transition("B", GeoEvent::Entry, here()).await;
        h.plugin
            .invoke("backgroundInitializedAck", Value::Null)
            .await
            .unwrap();

        let payloads = h.background.payloads_for(event_names::ON_GEOFENCE_MESSAGE);
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0]["geoRegion"]["radius"], json!(50.0));
        assert_eq!(payloads[0]["geoRegion"]["event"], json!("entry"));
    }

    #[tokio::test]
    async fn test_remove_regions_then_transition_queues_nothing() {
        let h = harness();
        h.plugin.invoke("addRegion", region_args("A")).await.unwrap();
        h.plugin.invoke("addRegion", region_args("B")).await.unwrap();

        h.plugin.invoke("removeRegions", Value::Null).await.unwrap();
        h.plugin.on_transition("A", GeoEvent::Entry, here()).await;

        assert_eq!(h.plugin.pending_events().await.unwrap(), 0);
        assert!(h.plugin.monitored_regions().await.is_empty());
        assert!(h.platform.calls().contains(&PlatformCall::StopMonitoringAll));
    }

    #[tokio::test]
    async fn test_remove_region() {
        let h = harness();
        h.plugin.invoke("addRegion", region_args("A")).await.unwrap();
        h.plugin.invoke("addRegion", region_args("B")).await.unwrap();

        h.plugin.invoke("removeRegion", region_args("A")).await.unwrap();
        h.plugin.invoke("removeRegion", region_args("A")).await.unwrap();

        assert_eq!(h.plugin.monitored_regions().await, vec!["B".to_string()]);
        let stops = h
            .platform
            .calls()
            .into_iter()
            .filter(|c| matches!(c, PlatformCall::StopMonitoring(_)))
            .count();
        assert_eq!(stops, 1);
    }

    #[tokio::test]
    async fn test_remove_regions_with_nothing_registered() {
        let h = harness();
        assert_eq!(
            h.plugin.invoke("removeRegions", Value::Null).await,
            Ok(Value::Null)
        );
    }
}

// =============================================================================
// Permissions
// =============================================================================

mod permissions {
    use super::*;

    #[tokio::test]
    async fn test_unauthorized_add_is_silently_ignored() {
        let h = harness_with(
            GeofenceConfig::default(),
            FakePlatform::new(),
            Persistence::in_memory(),
        );

        let result = h.plugin.invoke("addRegion", region_args("A")).await;

        assert_eq!(result, Ok(Value::Null));
        assert!(h.plugin.monitored_regions().await.is_empty());
        assert!(h.platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_strict_mode_reports_denial() {
        let config = GeofenceConfig {
            strict_permissions: true,
            ..GeofenceConfig::default()
        };
        let h = harness_with(config, FakePlatform::new(), Persistence::in_memory());

        let err = h
            .plugin
            .invoke("startListeningForLocationChanges", Value::Null)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            BridgeError::PermissionDenied("startListeningForLocationChanges".to_string())
        );
        assert_eq!(
            serde_json::to_value(&err).unwrap()["code"],
            json!("permission_denied")
        );
        assert!(!h.plugin.is_listening().await);
    }

    #[tokio::test]
    async fn test_permission_result_opens_gate() {
        let h = harness_with(
            GeofenceConfig::default(),
            FakePlatform::new(),
            Persistence::in_memory(),
        );

        h.plugin.invoke("requestPermissions", Value::Null).await.unwrap();
        assert_eq!(h.platform.calls(), vec![PlatformCall::RequestPermissions]);

        h.plugin.on_permission_result(true).await;
        h.plugin.invoke("addRegion", region_args("A")).await.unwrap();

        assert!(h.plugin.is_authorized().await);
        assert_eq!(h.plugin.monitored_regions().await, vec!["A".to_string()]);
    }

    #[tokio::test]
    async fn test_request_when_already_authorized() {
        let h = harness();

        h.plugin.invoke("requestPermissions", Value::Null).await.unwrap();

        assert!(h.plugin.is_authorized().await);
        assert!(h.platform.calls().is_empty());
    }
}

// =============================================================================
// Location
// =============================================================================

mod location {
    use super::*;

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    #[tokio::test]
    async fn test_fresh_fix_is_emitted() {
        let h = harness();
        h.platform.set_last_fix(Some(LocationFix {
            coordinate: Coordinate::new(10.5, -3.25).unwrap(),
            timestamp_ms: now_ms() - 5_000,
        }));

        h.plugin.invoke("getUserLocation", Value::Null).await.unwrap();

        assert_eq!(
            h.main.payloads_for(event_names::USER_LOCATION_UPDATED),
            vec![json!({"lat": 10.5, "lng": -3.25})]
        );
        assert!(!h.platform.calls().contains(&PlatformCall::RequestLocation));
    }

    #[tokio::test]
    async fn test_stale_fix_requests_update() {
        let h = harness();
        h.platform.set_last_fix(Some(LocationFix {
            coordinate: here(),
            timestamp_ms: now_ms() - 120_000,
        }));

        h.plugin.invoke("getUserLocation", Value::Null).await.unwrap();

        assert!(h.main.is_empty());
        assert_eq!(
            h.platform.calls(),
            vec![PlatformCall::LastKnownLocation, PlatformCall::RequestLocation]
        );

        h.plugin.on_user_location(here());
        assert_eq!(
            h.main.payloads_for(event_names::USER_LOCATION_UPDATED),
            vec![json!({"lat": 1.0, "lng": 2.0})]
        );
    }

    #[tokio::test]
    async fn test_no_fix_requests_update() {
        let h = harness();

        h.plugin.invoke("getUserLocation", Value::Null).await.unwrap();

        assert!(h.platform.calls().contains(&PlatformCall::RequestLocation));
    }

    #[tokio::test]
    async fn test_periodic_listening() {
        let h = harness();

        h.plugin
            .invoke("startListeningForLocationChanges", Value::Null)
            .await
            .unwrap();
        assert!(h.plugin.is_listening().await);
        h.plugin.on_background_location(here());

        h.plugin
            .invoke("stopListeningForLocationChanges", Value::Null)
            .await
            .unwrap();
        assert!(!h.plugin.is_listening().await);

        assert_eq!(
            h.platform.calls(),
            vec![
                PlatformCall::StartPeriodicUpdates(Duration::from_secs(900)),
                PlatformCall::StopPeriodicUpdates,
            ]
        );
        assert_eq!(
            h.main.payloads_for(event_names::BACKGROUND_LOCATION_UPDATED),
            vec![json!({"lat": 1.0, "lng": 2.0})]
        );
    }
}

// =============================================================================
// Failure contract
// =============================================================================

mod failures {
    use super::*;

    #[tokio::test]
    async fn test_unknown_method() {
        let h = harness();
        let err = h.plugin.invoke("teleport", Value::Null).await.unwrap_err();
        assert_eq!(err.code(), "not_implemented");
    }

    #[tokio::test]
    async fn test_malformed_arguments() {
        let h = harness();

        let err = h
            .plugin
            .invoke("addRegion", json!({"id": "A", "lat": "north", "lng": 0.0}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_arguments");

        let err = h
            .plugin
            .invoke("initializeBackground", json!({"pluginCallbackHandle": 1}))
            .await
            .unwrap_err();
        let wire = serde_json::to_value(&err).unwrap();
        assert_eq!(wire["code"], json!("invalid_arguments"));
        assert!(wire["message"].as_str().unwrap().contains("initializeBackground"));

        assert!(h.platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_adapter_failure_is_not_surfaced() {
        let h = harness();
        h.platform.fail_monitoring(true);

        let result = h.plugin.invoke("addRegion", region_args("A")).await;

        assert_eq!(result, Ok(Value::Null));
    }
}

// =============================================================================
// Durability across process restarts
// =============================================================================

mod durability {
    use super::*;

    #[tokio::test]
    async fn test_queued_events_survive_restart() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("geofence.db");

        {
            let h = harness_with(
                GeofenceConfig::default(),
                FakePlatform::authorized(),
                Persistence::sqlite(&db_path).unwrap(),
            );
            h.plugin.invoke("addRegion", region_args("A")).await.unwrap();
            h.plugin.invoke("initializeBackground", init_args()).await.unwrap();
            h.plugin.on_transition("A", GeoEvent::Entry, here()).await;
            assert_eq!(h.plugin.pending_events().await.unwrap(), 1);
        }

        let h = harness_with(
            GeofenceConfig::default(),
            FakePlatform::authorized(),
            Persistence::sqlite(&db_path).unwrap(),
        );
        assert_eq!(h.plugin.region_state("A").await, Some(RegionState::Inside));
        assert_eq!(h.plugin.pending_events().await.unwrap(), 1);

        assert!(h.plugin.resume_background().await);
        assert_eq!(h.platform.calls(), vec![PlatformCall::Launch(11)]);

        h.plugin
            .invoke("backgroundInitializedAck", Value::Null)
            .await
            .unwrap();
        h.plugin.on_transition("A", GeoEvent::Exit, here()).await;

        assert_eq!(delivered(&h.background), vec![entry("A", 22), exit("A", 22)]);
    }

    #[tokio::test]
    async fn test_resume_without_handles() {
        let h = harness();

        assert!(!h.plugin.resume_background().await);
        assert_eq!(h.plugin.gate_state().await, GateState::NotStarted);
        assert_eq!(h.platform.launches(), 0);
    }

    #[tokio::test]
    async fn test_resume_when_already_starting() {
        let h = harness();
        h.plugin.invoke("initializeBackground", init_args()).await.unwrap();

        assert!(!h.plugin.resume_background().await);
        assert_eq!(h.platform.launches(), 1);
    }
}

// =============================================================================
// Queue failures
// =============================================================================

mod queue_failures {
    use super::*;
    use geofence_core::{
        EventQueue, GeofenceError, MemoryHandleStore, MemoryQueue, MemoryRegionRepository,
        TransitionEvent,
    };
    use std::sync::atomic::{AtomicBool, Ordering};

    /// In-memory queue with switchable drain and count failures.
    #[derive(Default)]
    struct UnreliableQueue {
        inner: MemoryQueue,
        fail_drain: AtomicBool,
        fail_len: AtomicBool,
    }

    impl EventQueue for UnreliableQueue {
        fn push(&self, event: &TransitionEvent) -> geofence_core::Result<()> {
            self.inner.push(event)
        }

        fn drain(&self) -> geofence_core::Result<Vec<TransitionEvent>> {
            if self.fail_drain.load(Ordering::SeqCst) {
                return Err(GeofenceError::Storage("database is locked".into()));
            }
            self.inner.drain()
        }

        fn len(&self) -> geofence_core::Result<usize> {
            if self.fail_len.load(Ordering::SeqCst) {
                return Err(GeofenceError::Storage("database is locked".into()));
            }
            self.inner.len()
        }
    }

    fn harness_with_queue(queue: Arc<UnreliableQueue>) -> Harness {
        harness_with(
            GeofenceConfig::default(),
            FakePlatform::authorized(),
            Persistence {
                handles: Arc::new(MemoryHandleStore::new()),
                regions: Arc::new(MemoryRegionRepository::new()),
                queue,
            },
        )
    }

    #[tokio::test]
    async fn test_failed_drain_is_retried_in_order() {
        let queue = Arc::new(UnreliableQueue::default());
        let h = harness_with_queue(queue.clone());
        h.plugin.invoke("addRegion", region_args("A")).await.unwrap();
        h.plugin.invoke("initializeBackground", init_args()).await.unwrap();
        h.plugin.on_transition("A", GeoEvent::Entry, here()).await;

        queue.fail_drain.store(true, Ordering::SeqCst);
        h.plugin
            .invoke("backgroundInitializedAck", Value::Null)
            .await
            .unwrap();
        assert_eq!(h.plugin.gate_state().await, GateState::Starting);
        assert!(h.background.is_empty());

        h.plugin.on_transition("A", GeoEvent::Exit, here()).await;
        assert!(h.background.is_empty());
        assert_eq!(h.plugin.pending_events().await.unwrap(), 2);

        queue.fail_drain.store(false, Ordering::SeqCst);
        h.plugin
            .invoke("backgroundInitializedAck", Value::Null)
            .await
            .unwrap();

        assert_eq!(h.plugin.gate_state().await, GateState::Ready);
        assert_eq!(delivered(&h.background), vec![entry("A", 22), exit("A", 22)]);
        assert_eq!(h.plugin.pending_events().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pending_count_error_is_reported() {
        let queue = Arc::new(UnreliableQueue::default());
        let h = harness_with_queue(queue.clone());

        queue.fail_len.store(true, Ordering::SeqCst);

        assert!(h.plugin.pending_events().await.is_err());
    }
}

// =============================================================================
// Concurrent callbacks and ready acknowledgement
// =============================================================================

mod concurrency {
    use super::*;

    const REGIONS: usize = 8;
    const TRANSITIONS: usize = 50;

    /// Latitude encodes the transition's index within its region.
    fn nth(i: usize) -> Coordinate {
        Coordinate::new(i as f64 * 0.01, 0.0).unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_ack_during_transitions_delivers_each_event_once_in_order() {
        let h = harness();
        for r in 0..REGIONS {
            h.plugin
                .invoke("addRegion", region_args(&format!("R{r}")))
                .await
                .unwrap();
        }
        h.plugin.invoke("initializeBackground", init_args()).await.unwrap();

        let mut tasks = Vec::new();
        for r in 0..REGIONS {
            let plugin = h.plugin.clone();
            tasks.push(tokio::spawn(async move {
                let id = format!("R{r}");
                for i in 0..TRANSITIONS {
                    let kind = if i % 2 == 0 { GeoEvent::Entry } else { GeoEvent::Exit };
                    plugin.on_transition(&id, kind, nth(i)).await;
                    tokio::task::yield_now().await;
                }
            }));
        }
        let plugin = h.plugin.clone();
        let ack = tokio::spawn(async move {
            for _ in 0..REGIONS * 2 {
                tokio::task::yield_now().await;
            }
            plugin.invoke("backgroundInitializedAck", Value::Null).await
        });

        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(ack.await.unwrap(), Ok(Value::Null));

        assert_eq!(h.plugin.gate_state().await, GateState::Ready);
        assert_eq!(h.plugin.pending_events().await.unwrap(), 0);

        let payloads = h.background.payloads_for(event_names::ON_GEOFENCE_MESSAGE);
        assert_eq!(payloads.len(), REGIONS * TRANSITIONS);

        for r in 0..REGIONS {
            let id = format!("R{r}");
            let seen: Vec<(String, f64)> = payloads
                .iter()
                .filter(|p| p["geoRegion"]["id"] == json!(id))
                .map(|p| {
                    (
                        p["geoRegion"]["event"].as_str().unwrap().to_string(),
                        p["geoRegion"]["latitude"].as_f64().unwrap(),
                    )
                })
                .collect();
            let expected: Vec<(String, f64)> = (0..TRANSITIONS)
                .map(|i| {
                    let kind = if i % 2 == 0 { "entry" } else { "exit" };
                    (kind.to_string(), nth(i).latitude)
                })
                .collect();
            assert_eq!(seen, expected, "region {id}");
        }
    }
}
