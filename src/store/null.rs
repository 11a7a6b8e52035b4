//! Null adapter: discards writes, reports every key absent

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use crate::error::Result;
use crate::store::Store;

/// Backend that stores nothing.
///
/// Useful as a sink in tests and as the simplest possible terminal
/// layer when exercising middleware delegation. Advertises native TTL
/// support since any expiry hint is trivially honored.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAdapter;

impl NullAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Store for NullAdapter {
    async fn get(&self, _key: &[u8]) -> Result<Option<Bytes>> {
        Ok(None)
    }

    async fn set(&self, _key: &[u8], _value: Bytes, _ttl: Option<Duration>) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &[u8]) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }

    async fn exists(&self, _key: &[u8]) -> Result<bool> {
        Ok(false)
    }

    fn supports_ttl(&self) -> bool {
        true
    }
}
