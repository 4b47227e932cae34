//! SQLite snapshot storage.
//!
//! Persists snapshot records to a local SQLite database, one row per record:
//! - snapshots: id (primary key), name, timestamp, data (JSON categories)
//!
//! Supports:
//! - insert-or-replace saves (last writer wins)
//! - lookup by id, falling back to name (an id match always wins)
//! - cheap metadata listing, newest first
//! - deletion by id or name

pub mod diff;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use crate::fragment::Fragment;
use crate::snapshot::SnapshotRecord;

/// Snapshot metadata returned by list(). Fragment data is not loaded.
#[derive(Debug, Clone)]
pub struct SnapshotMeta {
    pub id: String,
    pub name: String,
    pub timestamp: i64,
}

/// Get the database path (~/.local/share/driftwatch/driftwatch.db or
/// platform equivalent)
pub fn default_db_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let data_dir = directories::ProjectDirs::from("", "", "driftwatch")
        .ok_or("Could not determine data directory")?
        .data_dir()
        .to_path_buf();

    std::fs::create_dir_all(&data_dir)?;
    Ok(data_dir.join("driftwatch.db"))
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS snapshots (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            data TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_snapshots_name ON snapshots(name)",
        [],
    )?;

    Ok(())
}

/// Database handle. Open once per command, reuse across all operations.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the database at `path`, or the platform default location when
    /// `path` is None. Creates the backing file and schema if absent.
    pub fn open(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let db_path = match path {
            Some(p) => {
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                p.to_path_buf()
            }
            None => default_db_path()?,
        };

        let conn = Connection::open(db_path)?;
        init_schema(&conn)?;
        Ok(Store { conn })
    }

    /// Save a record under its id. Saving an existing id replaces the old
    /// row; the single-statement write is atomic with respect to readers.
    pub fn save(&self, record: &SnapshotRecord) -> Result<(), Box<dyn std::error::Error>> {
        let data = serde_json::to_string(&record.categories)?;

        self.conn.execute(
            "INSERT OR REPLACE INTO snapshots (id, name, timestamp, data)
             VALUES (?1, ?2, ?3, ?4)",
            params![record.id, record.name, record.timestamp, data],
        )?;

        Ok(())
    }

    /// Look a record up by id, falling back to name. A miss is Ok(None),
    /// not an error; malformed stored data fails the read explicitly.
    pub fn get(
        &self,
        id_or_name: &str,
    ) -> Result<Option<SnapshotRecord>, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, timestamp, data FROM snapshots WHERE id = ?1",
        )?;
        let row = stmt
            .query_row(params![id_or_name], record_columns)
            .optional()?;

        if let Some(raw) = row {
            return Ok(Some(decode_record(raw)?));
        }

        // no id match: take the newest record carrying this display name
        let mut stmt = self.conn.prepare(
            "SELECT id, name, timestamp, data FROM snapshots
             WHERE name = ?1 ORDER BY timestamp DESC LIMIT 1",
        )?;
        let row = stmt
            .query_row(params![id_or_name], record_columns)
            .optional()?;

        match row {
            Some(raw) => Ok(Some(decode_record(raw)?)),
            None => Ok(None),
        }
    }

    /// List all records, newest first, without loading fragment data.
    pub fn list(&self) -> Result<Vec<SnapshotMeta>, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, timestamp FROM snapshots ORDER BY timestamp DESC",
        )?;

        let snapshots = stmt
            .query_map([], |row| {
                Ok(SnapshotMeta {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    timestamp: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(snapshots)
    }

    /// Delete all records matching by id or name. Returns whether anything
    /// was removed.
    pub fn delete(&self, id_or_name: &str) -> Result<bool, Box<dyn std::error::Error>> {
        let deleted = self.conn.execute(
            "DELETE FROM snapshots WHERE id = ?1 OR name = ?1",
            params![id_or_name],
        )?;

        Ok(deleted > 0)
    }

    pub fn exists(&self, id_or_name: &str) -> Result<bool, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare(
            "SELECT 1 FROM snapshots WHERE id = ?1 OR name = ?1 LIMIT 1",
        )?;
        let row = stmt
            .query_row(params![id_or_name], |_| Ok(()))
            .optional()?;

        Ok(row.is_some())
    }
}

type RawRecord = (String, String, i64, String);

fn record_columns(row: &rusqlite::Row) -> rusqlite::Result<RawRecord> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_record(raw: RawRecord) -> Result<SnapshotRecord, Box<dyn std::error::Error>> {
    let (id, name, timestamp, data) = raw;
    let categories: BTreeMap<String, Fragment> = serde_json::from_str(&data)
        .map_err(|e| format!("snapshot '{id}' has malformed stored data: {e}"))?;

    Ok(SnapshotRecord {
        id,
        name,
        timestamp,
        categories,
    })
}
