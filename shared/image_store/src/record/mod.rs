//! Embedded SQLite store for image metadata records
//!
//! Metadata is the source of truth for listing and quota accounting. Each row
//! carries the two-slot file reference (`original_path`, `derived_path`) so
//! promotion never has to reconstruct filenames from patterns.

mod error;

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

pub use error::{RecordError, RecordResult};

/// Metadata record of one stored image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Opaque unique identifier, assigned at creation
    pub id: String,
    /// Owning identity; `None` for the shared anonymous pool
    pub owner: Option<String>,
    /// Location of the source bytes, relative to the media root
    pub original_path: String,
    /// Location of the resized variant, if one has been generated
    pub derived_path: Option<String>,
    /// Optional time-to-live; `None` means the object never expires
    pub ttl: Option<Duration>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl ImageRecord {
    /// Whether the record's time-to-live has elapsed at `now`
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let Some(ttl) = self.ttl else { return false };
        match (now - self.created_at).to_std() {
            Ok(elapsed) => elapsed >= ttl,
            // created_at in the future: not expired
            Err(_) => false,
        }
    }

    /// Path of the served artifact: the derived slot once filled, else the
    /// original
    #[must_use]
    pub fn served_path(&self) -> &str {
        self.derived_path.as_deref().unwrap_or(&self.original_path)
    }
}

/// SQLite-backed record store
pub struct RecordStore {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS images (
    id            TEXT PRIMARY KEY,
    owner         TEXT,
    original_path TEXT NOT NULL,
    derived_path  TEXT,
    ttl_secs      INTEGER,
    created_at    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_images_owner ON images(owner);
";

impl RecordStore {
    /// Opens (and if needed initializes) the record database at `path`
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Db` if the database cannot be opened or the
    /// schema cannot be applied
    pub fn open(path: &Path) -> RecordResult<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> RecordResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RecordError::LockPoisoned)
    }

    /// Inserts a new record
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Db` on constraint violation or SQLite failure
    pub fn insert(&self, record: &ImageRecord) -> RecordResult<()> {
        let ttl_secs = record
            .ttl
            .map(|ttl| i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX));
        self.lock()?.execute(
            "INSERT INTO images (id, owner, original_path, derived_path, ttl_secs, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.owner,
                record.original_path,
                record.derived_path,
                ttl_secs,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Fetches a record by id
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Db` on SQLite failure
    pub fn get(&self, id: &str) -> RecordResult<Option<ImageRecord>> {
        let record = self
            .lock()?
            .query_row(
                "SELECT id, owner, original_path, derived_path, ttl_secs, created_at
                 FROM images WHERE id = ?1",
                params![id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Deletes a record by id; returns whether a row was removed
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Db` on SQLite failure
    pub fn delete(&self, id: &str) -> RecordResult<bool> {
        let changed = self
            .lock()?
            .execute("DELETE FROM images WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Fills the derived slot of a record
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Db` on SQLite failure
    pub fn set_derived(&self, id: &str, derived_path: &str) -> RecordResult<()> {
        self.lock()?.execute(
            "UPDATE images SET derived_path = ?2 WHERE id = ?1",
            params![id, derived_path],
        )?;
        Ok(())
    }

    /// Clears the derived slot of a record (promotion folds the variant into
    /// the original slot)
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Db` on SQLite failure
    pub fn clear_derived(&self, id: &str) -> RecordResult<()> {
        self.lock()?.execute(
            "UPDATE images SET derived_path = NULL WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }

    /// Lists all records in one namespace, oldest first (insertion order
    /// breaks creation-time ties)
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Db` on SQLite failure
    pub fn list(&self, owner: Option<&str>) -> RecordResult<Vec<ImageRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner, original_path, derived_path, ttl_secs, created_at
             FROM images WHERE owner IS ?1 ORDER BY created_at, rowid",
        )?;
        let rows = stmt.query_map(params![owner], row_to_record)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Number of records in one namespace
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Db` on SQLite failure
    pub fn count(&self, owner: Option<&str>) -> RecordResult<u64> {
        let count: i64 = self.lock()?.query_row(
            "SELECT COUNT(*) FROM images WHERE owner IS ?1",
            params![owner],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Oldest record in one namespace, if any
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Db` on SQLite failure
    pub fn oldest(&self, owner: Option<&str>) -> RecordResult<Option<ImageRecord>> {
        let record = self
            .lock()?
            .query_row(
                "SELECT id, owner, original_path, derived_path, ttl_secs, created_at
                 FROM images WHERE owner IS ?1 ORDER BY created_at, rowid LIMIT 1",
                params![owner],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Snapshot of an owner's records whose time-to-live has elapsed at `now`
    ///
    /// The snapshot is collected in full before any deletion happens, so the
    /// reaper never deletes out of a collection it is still iterating.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Db` on SQLite failure
    pub fn expired(&self, owner: &str, now: DateTime<Utc>) -> RecordResult<Vec<ImageRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner, original_path, derived_path, ttl_secs, created_at
             FROM images WHERE owner = ?1 AND ttl_secs IS NOT NULL
             ORDER BY created_at, rowid",
        )?;
        let rows = stmt.query_map(params![owner], row_to_record)?;
        let mut records = Vec::new();
        for row in rows {
            let record = row?;
            if record.is_expired(now) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ImageRecord> {
    let ttl_secs: Option<i64> = row.get(4)?;
    let created_at: String = row.get(5)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);
    Ok(ImageRecord {
        id: row.get(0)?,
        owner: row.get(1)?,
        original_path: row.get(2)?,
        derived_path: row.get(3)?,
        ttl: ttl_secs.map(|secs| Duration::from_secs(u64::try_from(secs).unwrap_or(0))),
        created_at,
    })
}
