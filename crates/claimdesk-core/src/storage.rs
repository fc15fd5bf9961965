//! # Storage Module
//!
//! Durable key-value storage for the session record.
//!
//! The record is stored as three string keys (`token`, `user_id`, `role`) so
//! that a partially written store still reads back predictably.
//!
//! Uses redb embedded database for:
//! - Crash safety (copy-on-write B-trees)
//! - ACID transactions, so a login or logout lands all keys or none

use crate::session::{Role, SessionRecord, UserId};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Key holding the user identifier.
pub const USER_ID_KEY: &str = "user_id";

/// Key holding the role wire text.
pub const ROLE_KEY: &str = "role";

const SESSION_TABLE: TableDefinition<&str, &str> = TableDefinition::new("session");

// =============================================================================
// ERROR TYPE
// =============================================================================

/// Errors from a session store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error while preparing the store location.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The embedded database failed.
    #[error("Storage error: {0}")]
    Database(#[from] redb::Error),
}

// =============================================================================
// KEY-VALUE STORE TRAIT
// =============================================================================

/// A durable string key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// Write several keys at once. Stores that support transactions apply
    /// them atomically.
    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Remove several keys at once.
    fn remove_many(&mut self, keys: &[&str]) -> Result<(), StoreError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-memory store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// REDB STORE
// =============================================================================

/// Disk-backed store on a single redb table.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish()
    }
}

impl RedbStore {
    /// Open the store at `path`, creating the file and parent directories.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path).map_err(redb::Error::from)?;
        Ok(Self { db })
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let txn = self.db.begin_read().map_err(redb::Error::from)?;
        let table = match txn.open_table(SESSION_TABLE) {
            Ok(table) => table,
            // Never written: same as empty.
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(redb::Error::from(e).into()),
        };
        let value = table
            .get(key)
            .map_err(redb::Error::from)?
            .map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.remove_many(&[key])
    }

    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(redb::Error::from)?;
        {
            let mut table = txn.open_table(SESSION_TABLE).map_err(redb::Error::from)?;
            for (key, value) in entries {
                table.insert(*key, *value).map_err(redb::Error::from)?;
            }
        }
        txn.commit().map_err(redb::Error::from)?;
        Ok(())
    }

    fn remove_many(&mut self, keys: &[&str]) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(redb::Error::from)?;
        {
            let mut table = txn.open_table(SESSION_TABLE).map_err(redb::Error::from)?;
            for key in keys {
                table.remove(*key).map_err(redb::Error::from)?;
            }
        }
        txn.commit().map_err(redb::Error::from)?;
        Ok(())
    }
}

// =============================================================================
// SESSION RECORD HELPERS
// =============================================================================

/// Read the session record. `None` unless a non-empty token is stored.
pub fn load_record<S: KeyValueStore + ?Sized>(
    store: &S,
) -> Result<Option<SessionRecord>, StoreError> {
    let Some(token) = store.get(TOKEN_KEY)?.filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let user_id = store.get(USER_ID_KEY)?.map(UserId).unwrap_or_default();
    let role = store.get(ROLE_KEY)?.map(Role::from).unwrap_or_default();
    Ok(Some(SessionRecord {
        token,
        user_id,
        role,
    }))
}

/// Write all three keys of the record.
pub fn save_record<S: KeyValueStore + ?Sized>(
    store: &mut S,
    record: &SessionRecord,
) -> Result<(), StoreError> {
    store.set_many(&[
        (TOKEN_KEY, record.token.as_str()),
        (USER_ID_KEY, record.user_id.as_str()),
        (ROLE_KEY, record.role.as_str()),
    ])
}

/// Remove all three keys of the record.
pub fn clear_record<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    store.remove_many(&[TOKEN_KEY, USER_ID_KEY, ROLE_KEY])
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record() -> SessionRecord {
        SessionRecord::new("tok-123", UserId::new("9"), Role::Admin)
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        save_record(&mut store, &record()).unwrap();
        assert_eq!(load_record(&store).unwrap(), Some(record()));

        clear_record(&mut store).unwrap();
        assert!(store.is_empty());
        assert_eq!(load_record(&store).unwrap(), None);
    }

    #[test]
    fn missing_token_means_no_record() {
        let mut store = MemoryStore::new();
        store.set(USER_ID_KEY, "9").unwrap();
        store.set(ROLE_KEY, "ADMIN").unwrap();
        assert_eq!(load_record(&store).unwrap(), None);

        store.set(TOKEN_KEY, "").unwrap();
        assert_eq!(load_record(&store).unwrap(), None);
    }

    #[test]
    fn token_without_role_defaults_to_user() {
        let mut store = MemoryStore::new();
        store.set(TOKEN_KEY, "abc").unwrap();
        let loaded = load_record(&store).unwrap().unwrap();
        assert_eq!(loaded.role, Role::User);
        assert_eq!(loaded.user_id, UserId::default());
    }

    #[test]
    fn redb_store_empty_database_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(&dir.path().join("session.redb")).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(load_record(&store).unwrap(), None);
    }

    #[test]
    fn redb_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.redb");

        {
            let mut store = RedbStore::open(&path).unwrap();
            save_record(&mut store, &record()).unwrap();
        }

        let mut store = RedbStore::open(&path).unwrap();
        assert_eq!(load_record(&store).unwrap(), Some(record()));

        clear_record(&mut store).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(USER_ID_KEY).unwrap(), None);
        assert_eq!(store.get(ROLE_KEY).unwrap(), None);
    }

    #[test]
    fn redb_clear_on_fresh_database_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = RedbStore::open(&dir.path().join("s.redb")).unwrap();
        clear_record(&mut store).unwrap();
        assert_eq!(load_record(&store).unwrap(), None);
    }
}
