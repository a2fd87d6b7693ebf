//! Object storage contract for model artifacts
//!
//! Cloud object stores (S3-style buckets, blob containers) are reached
//! through [`BlobStore`]: a flat namespace of `/`-separated keys mapping
//! to byte payloads. [`ObjectStoreModelRepository`](crate::repository::ObjectStoreModelRepository)
//! builds the model repository contract on top of it.
//!
//! # Example
//!
//! ```rust
//! use trueno_mlops::blob::{BlobStore, MemoryBlobStore};
//!
//! # async fn example() -> trueno_mlops::Result<()> {
//! let store = MemoryBlobStore::new();
//!
//! store.put("run-1/v1/model.zip", b"weights".to_vec()).await?;
//! assert_eq!(store.get("run-1/v1/model.zip").await?, Some(b"weights".to_vec()));
//! assert_eq!(store.get("run-1/v2/model.zip").await?, None);
//! # Ok(())
//! # }
//! ```

mod memory;

pub use memory::MemoryBlobStore;

use crate::Result;
use std::future::Future;

/// Byte-payload object store.
///
/// Artifact keys are versioned and never rewritten, and the metadata store
/// is the index of what a run uploaded, so only `get` and `put` are needed.
/// Implementations map transport and authorization failures onto
/// [`Error::StorageError`](crate::Error::StorageError) and never retry.
pub trait BlobStore: Send + Sync {
    /// Fetch an object.
    ///
    /// Returns `None` if the key doesn't exist.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Store an object, overwriting any existing payload.
    fn put(&self, key: &str, bytes: Vec<u8>) -> impl Future<Output = Result<()>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_blob_put_get() {
        let store = MemoryBlobStore::new();

        store.put("key1", b"value1".to_vec()).await.unwrap();
        let value = store.get("key1").await.unwrap();

        assert_eq!(value, Some(b"value1".to_vec()));
    }

    #[tokio::test]
    async fn test_memory_blob_get_nonexistent() {
        let store = MemoryBlobStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_blob_overwrite() {
        let store = MemoryBlobStore::new();

        store.put("key", b"value1".to_vec()).await.unwrap();
        store.put("key", b"value2".to_vec()).await.unwrap();

        assert_eq!(store.get("key").await.unwrap(), Some(b"value2".to_vec()));
    }

    #[tokio::test]
    async fn test_memory_blob_large_payload() {
        let store = MemoryBlobStore::new();

        let large = vec![7u8; 1024 * 1024]; // 1MB
        store.put("large", large.clone()).await.unwrap();

        assert_eq!(store.get("large").await.unwrap(), Some(large));
        assert_eq!(store.len(), 1);
    }
}
