//! # Storage Module
//!
//! String-keyed, string-valued persistence for the ledger, the shape of a
//! browser's local storage.
//!
//! ## Architecture
//!
//! ```text
//! mod.rs    : KeyValueStore trait and StorageError
//! memory.rs : In-process store for tests and throwaway sessions
//! db.rs     : sled-backed store that survives restarts
//! ```
//!
//! The ledger never depends on a concrete store. It takes any
//! `KeyValueStore`, so the same state machine runs against sled on disk or
//! a `HashMap` in a unit test.

pub mod db;
pub mod memory;

pub use db::SledStore;
pub use memory::MemoryStore;

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("stored value for {key} is not valid UTF-8")]
    NotUtf8 { key: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A local key-value store.
///
/// Writes to distinct keys are independent; there is no multi-key
/// transaction. Implementations must be shareable across threads so a
/// session can sit behind an `Arc`.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}
