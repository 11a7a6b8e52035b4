//! Store contract and the reference backend adapters
//!
//! Every layer in a stack, terminal backend or middleware, implements
//! the [`Store`] trait. Middleware implements it by wrapping another
//! implementer; the adapters in this module implement it against a real
//! storage medium.

pub mod file;
pub mod memory;
pub mod null;

pub use file::FileAdapter;
pub use memory::MemoryAdapter;
pub use null::NullAdapter;

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use crate::error::Result;

/// The uniform storage contract.
///
/// Absence is a normal, non-error result: `get` returns `Ok(None)` and
/// `delete` of a missing key is a no-op. Errors from the underlying
/// medium propagate unchanged through every layer; no layer retries or
/// suppresses them.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch the live value stored under `key`, or `None` if no live
    /// entry exists.
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>>;

    /// Store `value` under `key`, overwriting any existing entry.
    ///
    /// `ttl` is a native-expiry hint. Adapters without native TTL
    /// support must reject `Some(_)` with
    /// [`StoreError::TtlUnsupported`](crate::StoreError::TtlUnsupported);
    /// the expires middleware emulates TTL on top of them and always
    /// delegates with `ttl = None`.
    async fn set(&self, key: &[u8], value: Bytes, ttl: Option<Duration>) -> Result<()>;

    /// Remove the entry for `key` if present. Removing an absent key
    /// succeeds silently.
    async fn delete(&self, key: &[u8]) -> Result<()>;

    /// Remove all entries reachable through this layer.
    async fn clear(&self) -> Result<()>;

    /// Check whether a live entry is present for `key`.
    async fn exists(&self, key: &[u8]) -> Result<bool>;

    /// Whether this layer honors the `ttl` hint natively. Stacks built
    /// through the convenience constructor skip TTL emulation for
    /// adapters that return `true`.
    fn supports_ttl(&self) -> bool {
        false
    }
}
