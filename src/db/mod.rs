mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Key holding the JSON array of saved receipts.
pub(crate) const RECEIPTS_KEY: &str = "savedReceipts";
/// Key holding the highest receipt id ever issued.
pub(crate) const LAST_ID_KEY: &str = "lastReceiptId";
/// Key holding the JSON usage quota state.
pub(crate) const QUOTA_KEY: &str = "usageQuota";

/// String-keyed persistent store. Callers own serialization.
pub(crate) trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read key '{key}'"))?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, chrono::Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("Failed to write key '{key}'"))?;
        Ok(())
    }
}

/// Read and decode a JSON value, treating any failure as absent.
pub(crate) fn load_json<T: serde::de::DeserializeOwned>(store: &dyn KvStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "store read failed; starting fresh");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "stored value is corrupt; starting fresh");
            None
        }
    }
}

/// Encode and write a JSON value. Failures are logged, never returned.
pub(crate) fn save_json<T: serde::Serialize + ?Sized>(store: &dyn KvStore, key: &str, value: &T) {
    let encoded = match serde_json::to_string(value) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(key, error = %e, "failed to encode value");
            return;
        }
    };
    if let Err(e) = store.set(key, &encoded) {
        tracing::warn!(key, error = %e, "store write failed");
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    /// In-memory store with switchable read/write failures.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub(crate) values: RefCell<HashMap<String, String>>,
        pub(crate) fail_reads: Cell<bool>,
        pub(crate) fail_writes: Cell<bool>,
        pub(crate) writes: Cell<usize>,
    }

    impl MemoryStore {
        pub(crate) fn with(key: &str, value: &str) -> Self {
            let store = Self::default();
            store
                .values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            store
        }

        pub(crate) fn raw(&self, key: &str) -> Option<String> {
            self.values.borrow().get(key).cloned()
        }
    }

    impl KvStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            if self.fail_reads.get() {
                anyhow::bail!("read failure injected");
            }
            Ok(self.values.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes.get() {
                anyhow::bail!("write failure injected");
            }
            self.writes.set(self.writes.get() + 1);
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests;
