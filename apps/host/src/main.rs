//! Drives a `GeofencePlugin` from a JSON-lines script on stdin.
//!
//! Each input line is one step: a bridge call or a simulated OS callback.
//! Outbound events and call results are written to stdout as JSON lines;
//! logs go to stderr.
//!
//! ```text
//! {"step": "permission", "granted": true}
//! {"step": "invoke", "method": "addRegion", "args": {"id": "home", "lat": 1.0, "lng": 2.0}}
//! {"step": "regionState", "id": "home", "state": "inside", "lat": 1.0, "lng": 2.0}
//! ```

mod platform;

use anyhow::Context;
use geofence_core::{Coordinate, RegionState};
use geofence_events::FnEventBus;
use geofence_plugin::{Channels, GeofenceConfig, GeofencePlugin, Persistence, Platform};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use platform::LoggingPlatform;

#[derive(Debug, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
enum ScriptStep {
    Invoke {
        method: String,
        #[serde(default)]
        args: Value,
    },
    RegionState {
        id: String,
        state: RegionState,
        lat: f64,
        lng: f64,
    },
    UserLocation {
        lat: f64,
        lng: f64,
    },
    BackgroundLocation {
        lat: f64,
        lng: f64,
    },
    Permission {
        granted: bool,
    },
    Resume,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,geofence=debug")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => GeofenceConfig::load(Path::new(&path))
            .with_context(|| format!("failed to load config from {path}"))?,
        None => GeofenceConfig::default(),
    };
    let db_path = config.database_path();
    let persistence =
        Persistence::sqlite(&db_path).context("failed to open geofence database")?;

    tracing::info!(database = %db_path.display(), "starting geofence host");

    let plugin = GeofencePlugin::builder()
        .config(config)
        .platform(Platform::from_shared(Arc::new(LoggingPlatform)))
        .persistence(persistence)
        .channels(Channels {
            main: Arc::new(FnEventBus::new(|topic: &str, payload: Value| {
                print_line(json!({"channel": "main", "event": topic, "payload": payload}));
            })),
            background: Arc::new(FnEventBus::new(|topic: &str, payload: Value| {
                print_line(json!({"channel": "background", "event": topic, "payload": payload}));
            })),
        })
        .build();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<ScriptStep>(line) {
            Ok(step) => run_step(&plugin, step).await,
            Err(e) => tracing::warn!(error = %e, line, "skipping unreadable step"),
        }
    }

    tracing::info!("script finished");
    Ok(())
}

async fn run_step(plugin: &GeofencePlugin, step: ScriptStep) {
    match step {
        ScriptStep::Invoke { method, args } => {
            let reply = match plugin.invoke(&method, args).await {
                Ok(result) => json!({"reply": method, "result": result}),
                Err(e) => json!({"reply": method, "error": e}),
            };
            print_line(reply);
        }
        ScriptStep::RegionState { id, state, lat, lng } => {
            if let Some(at) = coordinate(lat, lng) {
                plugin.on_region_state(&id, state, at).await;
            }
        }
        ScriptStep::UserLocation { lat, lng } => {
            if let Some(at) = coordinate(lat, lng) {
                plugin.on_user_location(at);
            }
        }
        ScriptStep::BackgroundLocation { lat, lng } => {
            if let Some(at) = coordinate(lat, lng) {
                plugin.on_background_location(at);
            }
        }
        ScriptStep::Permission { granted } => plugin.on_permission_result(granted).await,
        ScriptStep::Resume => {
            let launched = plugin.resume_background().await;
            tracing::info!(launched, "background resume");
        }
    }
}

fn coordinate(lat: f64, lng: f64) -> Option<Coordinate> {
    match Coordinate::new(lat, lng) {
        Ok(at) => Some(at),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring invalid coordinate");
            None
        }
    }
}

fn print_line(value: Value) {
    println!("{value}");
}
