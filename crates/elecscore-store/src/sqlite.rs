use std::path::Path;

use parking_lot::ReentrantMutex;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::value::{PrefStore, PrefValue};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "elec-score";

/// [`PrefStore`] backed by a single SQLite table.
///
/// Every key lives under a namespace, so several independent stores can
/// share one database file. Several handles, possibly in different
/// processes, may open the same file; [`PrefStore::atomically`] maps to an
/// immediate SQLite transaction so their compound updates do not interleave.
///
/// The connection sits behind a reentrant lock: the thread running an
/// atomic block keeps it for the whole block while its own `get`/`put`
/// calls lock it again.
pub struct SqliteStore {
    conn: ReentrantMutex<Connection>,
    namespace: String,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run pending migrations.
    ///
    /// A writer that finds the file locked by another handle waits up to
    /// five seconds before failing.
    pub fn open(path: &Path, namespace: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL; PRAGMA busy_timeout=5000;",
        )?;
        debug!(path = %path.display(), namespace, "Opened preferences database");
        Self::with_connection(conn, namespace)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory(namespace: &str) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, namespace)
    }

    fn with_connection(conn: Connection, namespace: &str) -> Result<Self> {
        let mut store = Self {
            conn: ReentrantMutex::new(conn),
            namespace: namespace.to_string(),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&mut self) -> Result<()> {
        let conn = self.conn.get_mut();
        embedded::migrations::runner()
            .run(conn)
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        Ok(())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl PrefStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<PrefValue>> {
        let value: Option<Value> = self
            .conn
            .lock()
            .query_row(
                "SELECT value FROM prefs WHERE namespace = ?1 AND key = ?2",
                params![self.namespace, key],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Integer(i)) => Ok(Some(PrefValue::Integer(i))),
            Some(Value::Text(s)) => Ok(Some(PrefValue::Text(s))),
            Some(_) => Err(StoreError::TypeMismatch {
                key: key.to_string(),
                expected: "string or integer",
            }),
        }
    }

    fn put(&self, key: &str, value: PrefValue) -> Result<()> {
        let value = match value {
            PrefValue::Text(s) => Value::Text(s),
            PrefValue::Integer(i) => Value::Integer(i),
        };
        self.conn.lock().execute(
            "INSERT INTO prefs (namespace, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value",
            params![self.namespace, key, value],
        )?;
        Ok(())
    }

    fn atomically(&self, f: &mut dyn FnMut() -> Result<()>) -> Result<()> {
        let conn = self.conn.lock();
        if !conn.is_autocommit() {
            return f();
        }

        conn.execute_batch("BEGIN IMMEDIATE")?;
        let outcome = f().and_then(|()| conn.execute_batch("COMMIT").map_err(StoreError::from));
        if outcome.is_err()
            && !conn.is_autocommit()
            && let Err(e) = conn.execute_batch("ROLLBACK")
        {
            warn!(error = %e, "Failed to roll back preferences transaction");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let store = SqliteStore::open_in_memory(DEFAULT_NAMESPACE).unwrap();
        store.put_string("sess-u0", "abc").unwrap();
        store.put_u32("sess-e0", 42).unwrap();

        assert_eq!(store.get_string("sess-u0", "").unwrap(), "abc");
        assert_eq!(store.get_u32("sess-e0", 0).unwrap(), 42);
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let store = SqliteStore::open_in_memory(DEFAULT_NAMESPACE).unwrap();
        store.put_u32("sess-count", 1).unwrap();
        store.put_u32("sess-count", 2).unwrap();
        assert_eq!(store.get_u32("sess-count", 0).unwrap(), 2);
    }

    #[test]
    fn test_digit_strings_stay_text() {
        let store = SqliteStore::open_in_memory(DEFAULT_NAMESPACE).unwrap();
        store.put_string("k", "0123").unwrap();
        assert_eq!(store.get_string("k", "").unwrap(), "0123");
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.db");

        let a = SqliteStore::open(&path, "a").unwrap();
        a.put_string("key", "from-a").unwrap();
        drop(a);

        let b = SqliteStore::open(&path, "b").unwrap();
        assert_eq!(b.get_string("key", "none").unwrap(), "none");
    }

    #[test]
    fn test_atomically_commits_all_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.db");
        let writer = SqliteStore::open(&path, DEFAULT_NAMESPACE).unwrap();
        let reader = SqliteStore::open(&path, DEFAULT_NAMESPACE).unwrap();

        writer
            .atomically(&mut || {
                writer.put_string("sess-u0", "abc")?;
                writer.put_u32("sess-count", 1)
            })
            .unwrap();

        assert_eq!(reader.get_string("sess-u0", "").unwrap(), "abc");
        assert_eq!(reader.get_u32("sess-count", 0).unwrap(), 1);
    }

    #[test]
    fn test_atomically_rolls_back_on_error() {
        let store = SqliteStore::open_in_memory(DEFAULT_NAMESPACE).unwrap();
        store.put_u32("sess-count", 1).unwrap();

        let err = store
            .atomically(&mut || {
                store.put_u32("sess-count", 2)?;
                store.put_u64("huge", u64::MAX)
            })
            .unwrap_err();

        assert!(matches!(err, StoreError::ValueOutOfRange { .. }));
        assert_eq!(store.get_u32("sess-count", 0).unwrap(), 1);
        assert!(store.conn.lock().is_autocommit());
    }

    #[test]
    fn test_nested_atomically_joins_outer_transaction() {
        let store = SqliteStore::open_in_memory(DEFAULT_NAMESPACE).unwrap();

        let result = store.atomically(&mut || {
            store.atomically(&mut || store.put_u32("inner", 1))?;
            store.put_u64("huge", u64::MAX)
        });

        assert!(result.is_err());
        assert_eq!(store.get("inner").unwrap(), None);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.db");

        {
            let store = SqliteStore::open(&path, DEFAULT_NAMESPACE).unwrap();
            store.put_u32("sess-count", 5).unwrap();
        }

        let store = SqliteStore::open(&path, DEFAULT_NAMESPACE).unwrap();
        assert_eq!(store.get_u32("sess-count", 0).unwrap(), 5);
    }
}
