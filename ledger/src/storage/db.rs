//! # SledStore: Persistent Local Storage
//!
//! The on-disk [`KeyValueStore`], built on sled's embedded key-value store.
//!
//! ## Tree Layout
//!
//! | Tree            | Key           | Value          |
//! |-----------------|---------------|----------------|
//! | `local_storage` | key (UTF-8)   | value (UTF-8)  |
//!
//! Every write is flushed before returning, so a value that `set` accepted
//! is still there after a crash. The ledger writes a handful of small
//! values per transaction; flush latency is not a concern.

use sled::{Db, Tree};
use std::path::Path;

use super::{KeyValueStore, StorageError, StorageResult};

/// Name of the sled tree holding the ledger's keys.
const LOCAL_STORAGE_TREE: &str = "local_storage";

/// sled-backed local storage.
///
/// Cheap to clone; clones share the same database handle.
#[derive(Debug, Clone)]
pub struct SledStore {
    db: Db,
    entries: Tree,
}

impl SledStore {
    /// Open or create a store at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a store that is deleted when dropped. Meant for tests.
    pub fn open_temporary() -> StorageResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> StorageResult<Self> {
        let entries = db.open_tree(LOCAL_STORAGE_TREE)?;
        Ok(Self { db, entries })
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match self.entries.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|_| StorageError::NotUtf8 {
                    key: key.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporary_store_roundtrip() {
        let store = SledStore::open_temporary().expect("temp store");
        assert_eq!(store.get("balance").unwrap(), None);

        store.set("balance", "3.20").unwrap();
        assert_eq!(store.get("balance").unwrap().as_deref(), Some("3.20"));

        store.set("balance", "2.20").unwrap();
        assert_eq!(store.get("balance").unwrap().as_deref(), Some("2.20"));
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = SledStore::open(dir.path()).expect("open");
            store.set("userName", "ADA").unwrap();
        }
        let store = SledStore::open(dir.path()).expect("reopen");
        assert_eq!(store.get("userName").unwrap().as_deref(), Some("ADA"));
    }

    #[test]
    fn non_utf8_value_is_reported() {
        let store = SledStore::open_temporary().expect("temp store");
        store
            .entries
            .insert(b"balance".as_slice(), vec![0xFF, 0xFE])
            .unwrap();
        assert!(matches!(
            store.get("balance"),
            Err(StorageError::NotUtf8 { .. })
        ));
    }
}
