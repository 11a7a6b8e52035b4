//! Mutual-exclusion middleware

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::store::Store;

/// Middleware serializing all access to a non-thread-safe inner layer.
///
/// Every contract operation holds one guard across its delegation, so
/// operations against the same stack instance are totally ordered. The
/// guard is an RAII lock: it is released on every exit path, including
/// when the inner call returns an error. Scope is one in-process stack
/// instance: no per-key granularity, no cross-process locking.
///
/// Placement matters: declared outermost it serializes the whole chain
/// including transformation, declared innermost only backend access.
/// Declaration order in the builder decides.
pub struct Lock {
    inner: Box<dyn Store>,
    guard: Mutex<()>,
}

impl Lock {
    /// Wrap `inner` with a single mutual-exclusion guard
    pub fn new(inner: Box<dyn Store>) -> Self {
        Self {
            inner,
            guard: Mutex::new(()),
        }
    }
}

#[async_trait]
impl Store for Lock {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        let _guard = self.guard.lock().await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &[u8], value: Bytes, ttl: Option<Duration>) -> Result<()> {
        let _guard = self.guard.lock().await;
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        let _guard = self.guard.lock().await;
        self.inner.delete(key).await
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.guard.lock().await;
        self.inner.clear().await
    }

    async fn exists(&self, key: &[u8]) -> Result<bool> {
        let _guard = self.guard.lock().await;
        self.inner.exists(key).await
    }

    fn supports_ttl(&self) -> bool {
        self.inner.supports_ttl()
    }
}
