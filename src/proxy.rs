//! Generic middleware skeleton
//!
//! `Proxy` wraps exactly one inner store and implements every contract
//! operation by explicit delegation. On its own it is a no-op layer
//! (registered as `"proxy"`); it also documents the shape every
//! concrete middleware follows: hold an inner `Box<dyn Store>`,
//! intercept the operations you care about, forward the rest.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use crate::error::Result;
use crate::store::Store;

/// Pure pass-through middleware around one inner store layer
pub struct Proxy {
    inner: Box<dyn Store>,
}

impl Proxy {
    /// Wrap `inner` with a transparent delegation layer
    pub fn new(inner: Box<dyn Store>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Store for Proxy {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &[u8], value: Bytes, ttl: Option<Duration>) -> Result<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        self.inner.delete(key).await
    }

    async fn clear(&self) -> Result<()> {
        self.inner.clear().await
    }

    async fn exists(&self, key: &[u8]) -> Result<bool> {
        self.inner.exists(key).await
    }

    fn supports_ttl(&self) -> bool {
        self.inner.supports_ttl()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryAdapter, NullAdapter};

    #[tokio::test]
    async fn test_proxy_delegates_every_operation() {
        let proxy = Proxy::new(Box::new(MemoryAdapter::new()));

        proxy.set(b"k", Bytes::from_static(b"v"), None).await.unwrap();
        assert_eq!(proxy.get(b"k").await.unwrap(), Some(Bytes::from_static(b"v")));
        assert!(proxy.exists(b"k").await.unwrap());

        proxy.delete(b"k").await.unwrap();
        assert!(!proxy.exists(b"k").await.unwrap());

        proxy.set(b"a", Bytes::from_static(b"1"), None).await.unwrap();
        proxy.clear().await.unwrap();
        assert_eq!(proxy.get(b"a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_proxy_forwards_ttl_capability() {
        let over_memory = Proxy::new(Box::new(MemoryAdapter::new()));
        assert!(!over_memory.supports_ttl());

        let over_null = Proxy::new(Box::new(NullAdapter::new()));
        assert!(over_null.supports_ttl());
    }

    #[tokio::test]
    async fn test_proxy_propagates_inner_errors() {
        let proxy = Proxy::new(Box::new(MemoryAdapter::new()));
        let result = proxy
            .set(b"k", Bytes::from_static(b"v"), Some(Duration::from_secs(1)))
            .await;
        assert!(matches!(
            result,
            Err(crate::StoreError::TtlUnsupported { .. })
        ));
    }
}
