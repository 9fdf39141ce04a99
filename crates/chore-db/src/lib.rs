//! Storage layer for recurring task tracking.
//!
//! Persists tracked item names and their full perception histories using
//! `rusqlite`. Reconciled intervals are never stored: loading replays each
//! history through [`TrackedItem::from_perceptions`], which rebuilds them.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Ordering
//!
//! Each perception row carries a per-item `seq` column holding its position in
//! the history. Histories are read back `ORDER BY seq`, never by timestamp, so
//! insertion order survives a round trip exactly.
//!
//! ## Timestamp Format
//!
//! Perception timestamps are stored as the caller's raw INTEGER. The
//! bookkeeping `created_at` column is TEXT in RFC 3339 format.

use std::path::Path;

use chore_core::{
    ItemError, ItemName, Perception, PerceptionKind, Registry, RegistryError, TrackedItem,
    ValidationError,
};
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use thiserror::Error;
use uuid::Uuid;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored name failed validation.
    #[error("invalid stored item: {0}")]
    Validation(#[from] ValidationError),
    /// A stored perception kind is not recognised.
    #[error("invalid perception kind for item {item}: {kind}")]
    UnknownKind { item: String, kind: String },
    /// Stored items could not be assembled into a registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A stored history could not be replayed.
    #[error("failed to rebuild item {item}")]
    Replay {
        item: String,
        #[source]
        source: ItemError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Row counts for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    pub items: usize,
    pub perceptions: usize,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            );

            -- Perceptions: the append-only history of one item
            -- seq: zero-based position in the item's history
            -- kind: 'observation' or 'execution'
            CREATE TABLE IF NOT EXISTS perceptions (
                item_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                kind TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                PRIMARY KEY (item_id, seq),
                FOREIGN KEY (item_id) REFERENCES items(id) ON DELETE CASCADE
            );
            ",
        )?;
        Ok(())
    }

    /// Stores one item, replacing any previously stored history for its name.
    pub fn save_item(&mut self, item: &TrackedItem) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        write_item(&tx, item)?;
        tx.commit()?;
        Ok(())
    }

    /// Stores every item in the registry in a single transaction.
    ///
    /// Stored items whose names are no longer in the registry are deleted, so
    /// the database mirrors the registry afterwards.
    pub fn save_registry(&mut self, registry: &Registry) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        for item in registry {
            write_item(&tx, item)?;
        }
        let names: Vec<&str> = registry.iter().map(|item| item.name().as_str()).collect();
        let removed = if names.is_empty() {
            tx.execute("DELETE FROM items", [])?
        } else {
            let placeholders = vec!["?"; names.len()].join(", ");
            let query = format!("DELETE FROM items WHERE name NOT IN ({placeholders})");
            tx.execute(&query, params_from_iter(names.iter()))?
        };
        tx.commit()?;
        tracing::debug!(items = registry.len(), removed, "registry saved");
        Ok(())
    }

    /// Loads one item by name.
    pub fn load_item(&self, name: &str) -> Result<Option<TrackedItem>, DbError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name FROM items WHERE name = ?",
                params![name.trim()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        row.map(|(id, name)| self.rebuild_item(&id, name)).transpose()
    }

    /// Loads every stored item, in the order they were first saved.
    pub fn load_registry(&self) -> Result<Registry, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM items ORDER BY created_at ASC, rowid ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut registry = Registry::new();
        for row in rows {
            let (id, name) = row?;
            registry.insert(self.rebuild_item(&id, name)?)?;
        }
        Ok(registry)
    }

    /// Deletes the named item and its history. Returns whether it existed.
    pub fn delete_item(&mut self, name: &str) -> Result<bool, DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM items WHERE name = ?", params![name.trim()])?;
        Ok(deleted > 0)
    }

    /// Lists stored item names in the order they were first saved.
    pub fn item_names(&self) -> Result<Vec<String>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM items ORDER BY created_at ASC, rowid ASC")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }

    /// Counts stored items and perceptions.
    pub fn counts(&self) -> Result<StoreCounts, DbError> {
        let (items, perceptions): (usize, usize) = self.conn.query_row(
            "SELECT (SELECT COUNT(*) FROM items), (SELECT COUNT(*) FROM perceptions)",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(StoreCounts { items, perceptions })
    }

    fn rebuild_item(&self, id: &str, name: String) -> Result<TrackedItem, DbError> {
        let perceptions = self.load_perceptions(id, &name)?;
        let item_name = ItemName::new(name.clone())?;
        TrackedItem::from_perceptions(item_name, perceptions)
            .map_err(|source| DbError::Replay { item: name, source })
    }

    fn load_perceptions(&self, item_id: &str, name: &str) -> Result<Vec<Perception>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT kind, timestamp
            FROM perceptions
            WHERE item_id = ?
            ORDER BY seq ASC
            ",
        )?;
        let rows = stmt.query_map(params![item_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut perceptions = Vec::new();
        for row in rows {
            let (kind, timestamp) = row?;
            let kind: PerceptionKind = kind.parse().map_err(|_| DbError::UnknownKind {
                item: name.to_string(),
                kind,
            })?;
            perceptions.push(Perception::new(kind, timestamp));
        }
        Ok(perceptions)
    }
}

/// Upserts the item row and rewrites its history.
fn write_item(conn: &Connection, item: &TrackedItem) -> Result<(), DbError> {
    let name = item.name().as_str();
    conn.execute(
        "INSERT INTO items (id, name, created_at) VALUES (?, ?, ?) ON CONFLICT(name) DO NOTHING",
        params![
            Uuid::new_v4().to_string(),
            name,
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        ],
    )?;
    let id: String = conn.query_row("SELECT id FROM items WHERE name = ?", params![name], |row| {
        row.get(0)
    })?;

    conn.execute("DELETE FROM perceptions WHERE item_id = ?", params![id])?;
    let mut stmt = conn.prepare(
        "INSERT INTO perceptions (item_id, seq, kind, timestamp) VALUES (?, ?, ?, ?)",
    )?;
    for (seq, perception) in item.perceptions().iter().enumerate() {
        let seq = i64::try_from(seq).unwrap_or(i64::MAX);
        stmt.execute(params![
            id,
            seq,
            perception.kind.as_str(),
            perception.timestamp
        ])?;
    }
    tracing::debug!(item = name, perceptions = item.event_count(), "item saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> TrackedItem {
        let mut item = TrackedItem::new("water plant").unwrap();
        item.record_perception(PerceptionKind::Observation, 0).unwrap();
        item.record_perception(PerceptionKind::Execution, 10).unwrap();
        item.record_perception(PerceptionKind::Observation, 45).unwrap();
        item.record_perception(PerceptionKind::Observation, 48).unwrap();
        item.record_perception(PerceptionKind::Execution, 50).unwrap();
        item.record_perception(PerceptionKind::Execution, 90).unwrap();
        item
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");
        assert_eq!(table_columns(&db.conn, "items"), vec!["id", "name", "created_at"]);
        assert_eq!(
            table_columns(&db.conn, "perceptions"),
            vec!["item_id", "seq", "kind", "timestamp"]
        );
    }

    #[test]
    fn save_and_load_item_reproduces_metrics() {
        let mut db = Database::open_in_memory().unwrap();
        let item = sample_item();
        db.save_item(&item).unwrap();

        let loaded = db.load_item("water plant").unwrap().expect("item stored");
        assert_eq!(loaded, item);
        assert_eq!(loaded.metrics(), item.metrics());
        assert_eq!(loaded.intervals(), item.intervals());
    }

    #[test]
    fn load_missing_item_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_item("ghost").unwrap().is_none());
    }

    #[test]
    fn save_item_is_idempotent_and_replaces_history() {
        let mut db = Database::open_in_memory().unwrap();
        let mut item = sample_item();
        db.save_item(&item).unwrap();
        db.save_item(&item).unwrap();
        assert_eq!(
            db.counts().unwrap(),
            StoreCounts {
                items: 1,
                perceptions: 6
            }
        );

        item.record_perception(PerceptionKind::Observation, 120).unwrap();
        db.save_item(&item).unwrap();
        assert_eq!(
            db.counts().unwrap(),
            StoreCounts {
                items: 1,
                perceptions: 7
            }
        );
        assert_eq!(db.load_item("water plant").unwrap(), Some(item));
    }

    #[test]
    fn save_registry_mirrors_registry() {
        let mut db = Database::open_in_memory().unwrap();
        let mut registry = Registry::new();
        registry.insert(sample_item()).unwrap();
        registry.create("descale kettle").unwrap();
        registry
            .record("descale kettle", PerceptionKind::Execution, 7)
            .unwrap();
        db.save_registry(&registry).unwrap();

        assert_eq!(
            db.item_names().unwrap(),
            vec!["water plant".to_string(), "descale kettle".to_string()]
        );
        assert_eq!(db.load_registry().unwrap(), registry);

        registry.remove("water plant");
        db.save_registry(&registry).unwrap();
        assert_eq!(db.item_names().unwrap(), vec!["descale kettle".to_string()]);
        assert_eq!(
            db.counts().unwrap(),
            StoreCounts {
                items: 1,
                perceptions: 1
            }
        );

        registry.remove("descale kettle");
        db.save_registry(&registry).unwrap();
        assert!(db.load_registry().unwrap().is_empty());
    }

    #[test]
    fn delete_item_cascades_to_history() {
        let mut db = Database::open_in_memory().unwrap();
        db.save_item(&sample_item()).unwrap();

        assert!(db.delete_item("water plant").unwrap());
        assert!(!db.delete_item("water plant").unwrap());
        assert_eq!(
            db.counts().unwrap(),
            StoreCounts {
                items: 0,
                perceptions: 0
            }
        );
    }

    #[test]
    fn unknown_stored_kind_is_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        db.save_item(&sample_item()).unwrap();
        db.conn
            .execute("UPDATE perceptions SET kind = 'invalid' WHERE seq = 0", [])
            .unwrap();

        let err = db.load_item("water plant").unwrap_err();
        assert!(matches!(err, DbError::UnknownKind { ref kind, .. } if kind == "invalid"));
    }

    #[test]
    fn unordered_stored_history_fails_replay() {
        let mut db = Database::open_in_memory().unwrap();
        db.save_item(&sample_item()).unwrap();
        db.conn
            .execute("UPDATE perceptions SET timestamp = 1000 WHERE seq = 0", [])
            .unwrap();

        let err = db.load_registry().unwrap_err();
        assert!(matches!(err, DbError::Replay { .. }));
    }

    #[test]
    fn stored_span_too_long_to_measure_fails_replay() {
        let mut db = Database::open_in_memory().unwrap();
        db.save_item(&sample_item()).unwrap();
        db.conn
            .execute(
                "UPDATE perceptions SET timestamp = ?1 WHERE seq IN (0, 1)",
                params![i64::MIN],
            )
            .unwrap();

        let err = db.load_item("water plant").unwrap_err();
        assert!(matches!(
            err,
            DbError::Replay {
                source: chore_core::ItemError::Interval(chore_core::IntervalError::TooLong { .. }),
                ..
            }
        ));
    }

    #[test]
    fn reopening_file_database_keeps_items() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("chore.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.save_item(&sample_item()).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.load_item("water plant").unwrap(), Some(sample_item()));
    }
}
