//! In-memory blob store using `DashMap`.
//!
//! Stands in for a cloud bucket in tests and single-process jobs; data is
//! lost on process restart.

use super::BlobStore;
use crate::Result;
use dashmap::DashMap;

/// In-memory object store backed by a lock-free concurrent hashmap.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: DashMap<String, Vec<u8>>,
}

impl MemoryBlobStore {
    /// Create a new empty blob store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when no objects are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.objects.get(key).map(|v| v.value().clone()))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.objects.insert(key.to_string(), bytes);
        Ok(())
    }
}
