//! TTL emulation middleware
//!
//! Wraps each stored value in a record carrying an optional expiry
//! timestamp and applies lazy expiration on read: once the timestamp
//! has passed the entry is logically absent, whether or not the inner
//! store has physically removed it. Observing an expired record
//! triggers a best-effort cleanup delete; physical removal is
//! eventual, logical absence is immediate.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{trace, warn};

use crate::error::{Result, StoreError};
use crate::store::Store;

/// Stored representation: the raw value plus its expiry timestamp in
/// epoch milliseconds (`None` = never expires)
#[derive(Debug, Serialize, Deserialize)]
struct ExpiryRecord {
    expires_at: Option<u64>,
    value: Vec<u8>,
}

impl ExpiryRecord {
    fn expired(&self, now: u64) -> bool {
        match self.expires_at {
            Some(at) => at <= now,
            None => false,
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Middleware emulating per-entry TTL for inner layers without native
/// expiration support.
///
/// Should not be composed over a backend that advertises native TTL;
/// that policy decision belongs to whoever configures the chain (the
/// convenience constructor makes it automatically).
pub struct Expires {
    inner: Box<dyn Store>,
}

impl Expires {
    /// Wrap `inner` with TTL emulation
    pub fn new(inner: Box<dyn Store>) -> Self {
        Self { inner }
    }

    /// Fetch and unwrap the record for `key`, applying lazy expiration.
    async fn live_record(&self, key: &[u8]) -> Result<Option<ExpiryRecord>> {
        let Some(stored) = self.inner.get(key).await? else {
            return Ok(None);
        };

        // A record that fails to parse is corrupt or foreign data,
        // never silent absence.
        let record: ExpiryRecord =
            serde_json::from_slice(&stored).map_err(|e| StoreError::Decode {
                stage: "expires".to_string(),
                message: e.to_string(),
            })?;

        if record.expired(now_millis()) {
            trace!(expires_at = ?record.expires_at, "entry expired, cleaning up");
            // Best-effort physical cleanup; the entry is already
            // logically absent even if this delete fails or another
            // reader races it.
            if let Err(e) = self.inner.delete(key).await {
                warn!(error = %e, "failed to delete expired entry");
            }
            return Ok(None);
        }

        Ok(Some(record))
    }
}

#[async_trait]
impl Store for Expires {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        Ok(self
            .live_record(key)
            .await?
            .map(|record| Bytes::from(record.value)))
    }

    async fn set(&self, key: &[u8], value: Bytes, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl.map(|ttl| {
            let ttl_millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
            now_millis().saturating_add(ttl_millis)
        });
        let record = ExpiryRecord {
            expires_at,
            value: value.to_vec(),
        };
        let encoded = serde_json::to_vec(&record).map_err(|e| StoreError::Encode {
            stage: "expires".to_string(),
            message: e.to_string(),
        })?;
        self.inner.set(key, Bytes::from(encoded), None).await
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        self.inner.delete(key).await
    }

    async fn clear(&self) -> Result<()> {
        self.inner.clear().await
    }

    async fn exists(&self, key: &[u8]) -> Result<bool> {
        // An existence check must honor expiry: a physically present
        // but expired entry is logically absent.
        Ok(self.live_record(key).await?.is_some())
    }

    fn supports_ttl(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryAdapter;
    use std::sync::Arc;
    use tokio::time::sleep;

    struct SharedMemory(Arc<MemoryAdapter>);

    #[async_trait]
    impl Store for SharedMemory {
        async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
            self.0.get(key).await
        }
        async fn set(&self, key: &[u8], value: Bytes, ttl: Option<Duration>) -> Result<()> {
            self.0.set(key, value, ttl).await
        }
        async fn delete(&self, key: &[u8]) -> Result<()> {
            self.0.delete(key).await
        }
        async fn clear(&self) -> Result<()> {
            self.0.clear().await
        }
        async fn exists(&self, key: &[u8]) -> Result<bool> {
            self.0.exists(key).await
        }
    }

    fn expires() -> (Arc<MemoryAdapter>, Expires) {
        let backend = Arc::new(MemoryAdapter::new());
        let store = Expires::new(Box::new(SharedMemory(backend.clone())));
        (backend, store)
    }

    #[tokio::test]
    async fn test_entry_without_ttl_never_expires() {
        let (_backend, store) = expires();
        store.set(b"k", Bytes::from_static(b"v"), None).await.unwrap();

        sleep(Duration::from_millis(50)).await;

        assert_eq!(store.get(b"k").await.unwrap(), Some(Bytes::from_static(b"v")));
        assert!(store.exists(b"k").await.unwrap());
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let (_backend, store) = expires();
        store
            .set(b"k", Bytes::from_static(b"v"), Some(Duration::from_millis(30)))
            .await
            .unwrap();

        assert!(store.exists(b"k").await.unwrap());

        sleep(Duration::from_millis(60)).await;

        assert_eq!(store.get(b"k").await.unwrap(), None);
        assert!(!store.exists(b"k").await.unwrap());
    }

    #[tokio::test]
    async fn test_huge_ttl_saturates_instead_of_wrapping() {
        let (_backend, store) = expires();
        store
            .set(b"k", Bytes::from_static(b"v"), Some(Duration::MAX))
            .await
            .unwrap();

        // A far-future expiry must stay live, not wrap into the past
        assert_eq!(store.get(b"k").await.unwrap(), Some(Bytes::from_static(b"v")));
        assert!(store.exists(b"k").await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_immediately_absent() {
        let (backend, store) = expires();
        store
            .set(b"k", Bytes::from_static(b"v"), Some(Duration::ZERO))
            .await
            .unwrap();

        // Physically written, logically absent
        assert!(backend.exists(b"k").await.unwrap());
        assert_eq!(store.get(b"k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_read_triggers_cleanup_delete() {
        let (backend, store) = expires();
        store
            .set(b"k", Bytes::from_static(b"v"), Some(Duration::ZERO))
            .await
            .unwrap();

        assert_eq!(store.get(b"k").await.unwrap(), None);
        // Lazy expiration removed the physical entry on observation
        assert!(!backend.exists(b"k").await.unwrap());
    }

    #[tokio::test]
    async fn test_overwrite_resets_expiry() {
        let (_backend, store) = expires();
        store
            .set(b"k", Bytes::from_static(b"old"), Some(Duration::from_millis(20)))
            .await
            .unwrap();
        store.set(b"k", Bytes::from_static(b"new"), None).await.unwrap();

        sleep(Duration::from_millis(50)).await;

        assert_eq!(
            store.get(b"k").await.unwrap(),
            Some(Bytes::from_static(b"new"))
        );
    }

    #[tokio::test]
    async fn test_corrupt_record_is_a_decode_error() {
        let (backend, store) = expires();
        backend
            .set(b"k", Bytes::from_static(b"{ not a record"), None)
            .await
            .unwrap();

        let err = store.get(b"k").await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_delegates_with_ttl_stripped() {
        // The inner memory adapter rejects native TTL hints, so this
        // succeeding proves the layer delegates with ttl = None.
        let (_backend, store) = expires();
        store
            .set(b"k", Bytes::from_static(b"v"), Some(Duration::from_secs(60)))
            .await
            .unwrap();
        assert!(store.exists(b"k").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_and_clear_delegate() {
        let (backend, store) = expires();
        store.set(b"a", Bytes::from_static(b"1"), None).await.unwrap();
        store.set(b"b", Bytes::from_static(b"2"), None).await.unwrap();

        store.delete(b"a").await.unwrap();
        assert!(!store.exists(b"a").await.unwrap());
        store.delete(b"a").await.unwrap(); // idempotent

        store.clear().await.unwrap();
        assert!(backend.is_empty());
    }
}
