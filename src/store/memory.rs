//! In-memory adapter backed by DashMap

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::time::Duration;

use crate::error::{Result, StoreError};
use crate::store::Store;

/// Concurrent in-memory backend.
///
/// Holds raw entries with no expiry metadata; TTL semantics come from
/// the expires middleware when requested. Individual operations are
/// thread-safe through DashMap, but multi-operation sequences are not;
/// wrap with the lock middleware when callers need serialization.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    data: DashMap<Vec<u8>, Bytes>,
}

impl MemoryAdapter {
    /// Create an empty memory adapter
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the adapter holds no entries
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl Store for MemoryAdapter {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        Ok(self.data.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &[u8], value: Bytes, ttl: Option<Duration>) -> Result<()> {
        if ttl.is_some() {
            return Err(StoreError::TtlUnsupported {
                adapter: "memory".to_string(),
            });
        }
        self.data.insert(key.to_vec(), value);
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        self.data.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.data.clear();
        Ok(())
    }

    async fn exists(&self, key: &[u8]) -> Result<bool> {
        Ok(self.data.contains_key(key))
    }
}
