//! Key-value store contracts and implementations.
//!
//! # Responsibility
//! - Provide the local string key-value storage the persistence adapter
//!   writes the note collection into.
//! - Keep SQL details inside the storage boundary.
//!
//! # Invariants
//! - `set` replaces the whole value stored under a key.
//! - `get` of a never-written key is `Ok(None)`, not an error.

use crate::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::rc::Rc;

pub type KvResult<T> = Result<T, KvError>;

/// Key-value storage failure.
#[derive(Debug)]
pub enum KvError {
    Db(DbError),
    /// Backend refused the write (quota, read-only medium, injected fault).
    WriteRejected(String),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::WriteRejected(reason) => write!(f, "write rejected: {reason}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::WriteRejected(_) => None,
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Local string key-value storage.
pub trait KeyValueStore {
    /// Reads the raw value stored under `key`.
    fn get(&self, key: &str) -> KvResult<Option<String>>;
    /// Replaces the raw value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> KvResult<()>;
}

/// In-memory store. Clones share the same entries, so a test can keep a
/// handle while the app owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `set` fail until switched back off.
    pub fn fail_writes(&self, enabled: bool) {
        self.fail_writes.set(enabled);
    }

    /// Stores a raw value directly, bypassing failure injection.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        if self.fail_writes.get() {
            return Err(KvError::WriteRejected("storage quota exceeded".to_string()));
        }
        self.insert_raw(key, value);
        Ok(())
    }
}

/// SQLite-backed store over the migrated `kv_entries` table.
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> KvResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, KvError, MemoryKvStore, SqliteKvStore};

    #[test]
    fn memory_store_clones_share_entries() {
        let handle = MemoryKvStore::new();
        let mut owned = handle.clone();
        owned.set("k", "v").unwrap();
        assert_eq!(handle.raw("k").as_deref(), Some("v"));
    }

    #[test]
    fn memory_store_rejects_writes_when_failing() {
        let mut store = MemoryKvStore::new();
        store.fail_writes(true);
        let err = store.set("k", "v").unwrap_err();
        assert!(matches!(err, KvError::WriteRejected(_)));
        assert_eq!(store.get("k").unwrap(), None);

        store.fail_writes(false);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn sqlite_store_upserts_values() {
        let mut store = SqliteKvStore::open_in_memory().unwrap();
        assert_eq!(store.get("notes").unwrap(), None);

        store.set("notes", "[]").unwrap();
        store.set("notes", "[1]").unwrap();
        assert_eq!(store.get("notes").unwrap().as_deref(), Some("[1]"));

        let rows: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
