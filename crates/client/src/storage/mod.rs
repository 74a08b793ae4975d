//! Durable client-side key-value storage.
//!
//! The session's tokens and the guest cart both outlive the process, so they
//! live behind the [`Storage`] trait: an opaque, synchronous key-value store
//! in the role browser local storage plays for a web front end.
//!
//! Two implementations ship with the crate: [`FileStore`] persists to a
//! single JSON file (the CLI's default), and [`MemoryStore`] keeps everything
//! in memory for tests and embedders that manage their own persistence.

mod file;
mod memory;
mod tokens;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use tokens::TokenStore;

use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized for persistence.
    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// An opaque durable key-value store.
///
/// Operations are synchronous and write-through: when a mutating call
/// returns, the change is durable. Values are opaque strings; callers own
/// their encoding.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be made durable.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key`; absent keys are a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be made durable.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
