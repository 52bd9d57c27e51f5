//! Geofence data model.
//!
//! Every value here validates its invariants on construction, so a
//! `GeoRegion` or `Coordinate` that exists is always well-formed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Radius applied when the application layer omits one.
pub const DEFAULT_RADIUS_METERS: f64 = 50.0;

/// Errors raised when a region or coordinate violates its invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionError {
    #[error("region identifier must not be empty")]
    EmptyId,

    #[error("radius must be a positive number of meters, got {0}")]
    InvalidRadius(f64),

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("a region must subscribe to at least one event")]
    EmptyEventSet,

    #[error("unknown geofence event '{0}'")]
    UnknownEvent(String),

    #[error("unknown region state '{0}'")]
    UnknownState(String),
}

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, RegionError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(RegionError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(RegionError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Direction of a region transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoEvent {
    Entry,
    Exit,
}

impl GeoEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeoEvent::Entry => "entry",
            GeoEvent::Exit => "exit",
        }
    }

    /// Membership state the device is in after this transition.
    pub fn resulting_state(&self) -> RegionState {
        match self {
            GeoEvent::Entry => RegionState::Inside,
            GeoEvent::Exit => RegionState::Outside,
        }
    }
}

impl fmt::Display for GeoEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeoEvent {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entry" => Ok(GeoEvent::Entry),
            "exit" => Ok(GeoEvent::Exit),
            other => Err(RegionError::UnknownEvent(other.to_string())),
        }
    }
}

/// Non-empty subset of {ENTRY, EXIT} a region is subscribed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSet {
    entry: bool,
    exit: bool,
}

impl EventSet {
    pub const ENTRY: Self = Self {
        entry: true,
        exit: false,
    };
    pub const EXIT: Self = Self {
        entry: false,
        exit: true,
    };
    pub const BOTH: Self = Self {
        entry: true,
        exit: true,
    };

    pub fn from_events<I>(events: I) -> Result<Self, RegionError>
    where
        I: IntoIterator<Item = GeoEvent>,
    {
        let mut set = Self {
            entry: false,
            exit: false,
        };
        for event in events {
            match event {
                GeoEvent::Entry => set.entry = true,
                GeoEvent::Exit => set.exit = true,
            }
        }
        if !set.entry && !set.exit {
            return Err(RegionError::EmptyEventSet);
        }
        Ok(set)
    }

    /// Maps the application layer's event selector onto a subscription.
    ///
    /// `"entry"` and `"exit"` (with or without the `GeolocationEvent.`
    /// prefix) select a single direction; anything else selects both.
    pub fn from_selector(selector: &str) -> Self {
        let name = selector
            .strip_prefix("GeolocationEvent.")
            .unwrap_or(selector);
        match name {
            "entry" => Self::ENTRY,
            "exit" => Self::EXIT,
            _ => Self::BOTH,
        }
    }

    pub fn contains(&self, event: GeoEvent) -> bool {
        match event {
            GeoEvent::Entry => self.entry,
            GeoEvent::Exit => self.exit,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = GeoEvent> {
        let entry = self.entry.then_some(GeoEvent::Entry);
        let exit = self.exit.then_some(GeoEvent::Exit);
        entry.into_iter().chain(exit)
    }
}

impl fmt::Display for EventSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|e| e.as_str()).collect();
        f.write_str(&names.join(","))
    }
}

impl FromStr for EventSet {
    type Err = RegionError;

    /// Parses the comma-joined form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let events = s
            .split(',')
            .filter(|part| !part.is_empty())
            .map(GeoEvent::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_events(events)
    }
}

/// A circular region monitored for transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRegion {
    id: String,
    radius: f64,
    center: Coordinate,
    events: EventSet,
}

impl GeoRegion {
    pub fn new(
        id: impl Into<String>,
        radius: f64,
        center: Coordinate,
        events: EventSet,
    ) -> Result<Self, RegionError> {
        let id = id.into();
        if id.is_empty() {
            return Err(RegionError::EmptyId);
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(RegionError::InvalidRadius(radius));
        }
        Ok(Self {
            id,
            radius,
            center,
            events,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn events(&self) -> EventSet {
        self.events
    }
}

/// Last observed membership of the device in a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionState {
    #[default]
    Unknown,
    Inside,
    Outside,
}

impl RegionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionState::Unknown => "unknown",
            RegionState::Inside => "inside",
            RegionState::Outside => "outside",
        }
    }

    /// Event kind that moving into this state represents, if any.
    pub fn transition_kind(&self) -> Option<GeoEvent> {
        match self {
            RegionState::Unknown => None,
            RegionState::Inside => Some(GeoEvent::Entry),
            RegionState::Outside => Some(GeoEvent::Exit),
        }
    }
}

impl fmt::Display for RegionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionState {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(RegionState::Unknown),
            "inside" => Ok(RegionState::Inside),
            "outside" => Ok(RegionState::Outside),
            other => Err(RegionError::UnknownState(other.to_string())),
        }
    }
}

/// A resolved region transition. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    region_id: String,
    kind: GeoEvent,
    radius: f64,
    coordinate: Coordinate,
    timestamp_ms: i64,
}

impl TransitionEvent {
    pub fn new(
        region_id: impl Into<String>,
        kind: GeoEvent,
        radius: f64,
        coordinate: Coordinate,
        timestamp_ms: i64,
    ) -> Self {
        Self {
            region_id: region_id.into(),
            kind,
            radius,
            coordinate,
            timestamp_ms,
        }
    }

    pub fn region_id(&self) -> &str {
        &self.region_id
    }

    pub fn kind(&self) -> GeoEvent {
        self.kind
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }
}
