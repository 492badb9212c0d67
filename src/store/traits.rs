//! `DraftStore` trait: the string-keyed storage collaborator.

use async_trait::async_trait;

use crate::error::StorageError;

/// Opaque key/value storage that drafts are written to.
///
/// Values are serialized strings; the store never interprets them.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`. Returns `false` if nothing was stored;
    /// a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;
}
