use geofence_core::{
    codec, CodecError, EventQueue, GeoRegion, GeofenceError, HandleStore, RegionError,
    RegionRepository, RegionState, TransitionEvent,
};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("corrupt region '{id}': {source}")]
    CorruptRegion {
        id: String,
        #[source]
        source: CodecError,
    },
    #[error("corrupt region state '{0}'")]
    CorruptState(#[from] RegionError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for GeofenceError {
    fn from(e: StorageError) -> Self {
        GeofenceError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// SQLite persistence for callback handles, monitored regions and the
/// pending event queue.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens (creating if needed) the database at `path`, including its
    /// parent directory.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        tracing::debug!(path = %path.display(), "geofence database opened");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS callback_handles (
                key TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS regions (
                id TEXT PRIMARY KEY,
                region_blob BLOB NOT NULL,
                state TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS pending_events (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                event_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_regions_created_at ON regions(created_at);
            "#,
        )?;
        Ok(())
    }

    fn load_regions_inner(&self) -> Result<Vec<(GeoRegion, RegionState)>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt =
            conn.prepare("SELECT id, region_blob, state FROM regions ORDER BY created_at, id")?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let blob: Vec<u8> = row.get(1)?;
            let state: String = row.get(2)?;
            Ok((id, blob, state))
        })?;

        let mut regions = Vec::new();
        for row in rows {
            let (id, blob, state) = row?;
            let region = codec::decode(&blob).map_err(|source| StorageError::CorruptRegion {
                id: id.clone(),
                source,
            })?;
            let state: RegionState = state.parse()?;
            regions.push((region, state));
        }
        Ok(regions)
    }

    fn drain_inner(&self) -> Result<Vec<TransitionEvent>> {
        let mut conn = self.conn.lock().expect("database mutex poisoned");
        let tx = conn.transaction()?;

        let rows: Vec<String> = {
            let mut stmt = tx.prepare("SELECT event_json FROM pending_events ORDER BY seq")?;
            let mapped = stmt.query_map([], |row| row.get(0))?;
            mapped.collect::<std::result::Result<_, _>>()?
        };
        tx.execute("DELETE FROM pending_events", [])?;
        tx.commit()?;

        let mut events = Vec::with_capacity(rows.len());
        for json in rows {
            match serde_json::from_str(&json) {
                Ok(event) => events.push(event),
                Err(e) => tracing::error!(error = %e, "dropping unreadable queued event"),
            }
        }
        Ok(events)
    }
}

impl HandleStore for Database {
    fn save_handle(&self, key: &str, handle: i64) -> geofence_core::Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO callback_handles (key, value) VALUES (?1, ?2)",
            (key, handle),
        )
        .map_err(StorageError::from)?;
        Ok(())
    }

    fn load_handle(&self, key: &str) -> geofence_core::Result<Option<i64>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let value = conn
            .query_row(
                "SELECT value FROM callback_handles WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(StorageError::from)?;
        Ok(value)
    }
}

impl RegionRepository for Database {
    fn save_region(&self, region: &GeoRegion, state: RegionState) -> geofence_core::Result<()> {
        let blob = codec::encode(region);
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            r#"INSERT INTO regions (id, region_blob, state, created_at) VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(id) DO UPDATE SET region_blob = excluded.region_blob, state = excluded.state"#,
            (region.id(), blob, state.as_str(), now),
        )
        .map_err(StorageError::from)?;
        Ok(())
    }

    fn delete_region(&self, id: &str) -> geofence_core::Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute("DELETE FROM regions WHERE id = ?1", [id])
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn clear_regions(&self) -> geofence_core::Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute("DELETE FROM regions", [])
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn load_regions(&self) -> geofence_core::Result<Vec<(GeoRegion, RegionState)>> {
        Ok(self.load_regions_inner()?)
    }
}

impl EventQueue for Database {
    fn push(&self, event: &TransitionEvent) -> geofence_core::Result<()> {
        let json = serde_json::to_string(event).map_err(StorageError::from)?;
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute("INSERT INTO pending_events (event_json) VALUES (?1)", [json])
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn drain(&self) -> geofence_core::Result<Vec<TransitionEvent>> {
        Ok(self.drain_inner()?)
    }

    fn len(&self) -> geofence_core::Result<usize> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM pending_events", [], |row| row.get(0))
            .map_err(StorageError::from)?;
        Ok(count as usize)
    }
}
