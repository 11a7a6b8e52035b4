//! The assembled middleware chain

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use crate::error::Result;
use crate::store::Store;

/// An assembled store chain: the outermost layer plus a description of
/// the chain for introspection.
///
/// Every operation enters at the outermost middleware and flows inward
/// to the terminal adapter. The chain shape is immutable once built; a
/// stack may be shared across tasks (wrap it in an `Arc`).
pub struct Stack {
    outer: Box<dyn Store>,
    layers: Vec<String>,
    adapter: String,
}

impl Stack {
    pub(crate) fn new(outer: Box<dyn Store>, layers: Vec<String>, adapter: String) -> Self {
        Self {
            outer,
            layers,
            adapter,
        }
    }

    /// Middleware names, outermost first
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    /// Name of the terminal adapter
    pub fn adapter_name(&self) -> &str {
        &self.adapter
    }
}

#[async_trait]
impl Store for Stack {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.outer.get(key).await
    }

    async fn set(&self, key: &[u8], value: Bytes, ttl: Option<Duration>) -> Result<()> {
        self.outer.set(key, value, ttl).await
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        self.outer.delete(key).await
    }

    async fn clear(&self) -> Result<()> {
        self.outer.clear().await
    }

    async fn exists(&self, key: &[u8]) -> Result<bool> {
        self.outer.exists(key).await
    }

    fn supports_ttl(&self) -> bool {
        self.outer.supports_ttl()
    }
}

impl std::fmt::Debug for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stack")
            .field("layers", &self.layers)
            .field("adapter", &self.adapter)
            .finish()
    }
}
