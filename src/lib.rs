//! Strata - composable key-value storage stacks
//!
//! One asynchronous store contract ([`Store`]), many backends, and a
//! middleware chain that layers cross-cutting behavior (key/value
//! encoding, TTL emulation, serialized access) onto any backend
//! without touching backend code.
//!
//! Build a chain declaratively with [`Builder`] (first declared layer
//! is outermost), or let [`open`] pick a sensible default chain for a
//! named backend:
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use strata::{open, Options, Store};
//! use bytes::Bytes;
//!
//! let stack = open("memory", Options::new()).unwrap();
//! stack.set(b"greeting", Bytes::from_static(b"hello"), None).await.unwrap();
//! assert_eq!(
//!     stack.get(b"greeting").await.unwrap(),
//!     Some(Bytes::from_static(b"hello"))
//! );
//! # }
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod logging;

// Composition modules
pub mod builder;
pub mod codec;
pub mod middleware;
pub mod proxy;
pub mod registry;
pub mod stack;
pub mod store;

// Public API exports
pub use builder::Builder;
pub use codec::{CodecStage, Pipeline, PipelineSide};
pub use config::{LoggingConfig, StackConfig};
pub use error::{Result, StoreError};
pub use middleware::{Expires, Lock, Transformer, TransformerConfig};
pub use proxy::Proxy;
pub use registry::{Options, Registry};
pub use stack::Stack;
pub use store::{FileAdapter, MemoryAdapter, NullAdapter, Store};

use serde_json::Value;
use tracing::debug;

/// Remove a recognized boolean flag from the options map, rejecting
/// non-boolean values.
fn take_flag(options: &mut Options, name: &str) -> Result<bool> {
    match options.remove(name) {
        None => Ok(false),
        Some(Value::Bool(flag)) => Ok(flag),
        Some(other) => Err(StoreError::config(format!(
            "option '{name}' must be a boolean, got {other}"
        ))),
    }
}

/// Default transformer pipeline for a named backend. Backend-specific
/// policy data, not core logic: backends that use keys as file paths
/// get an escaping or spreading key pipeline.
fn default_transformer(name: &str) -> Option<TransformerConfig> {
    match name {
        "file" => Some(TransformerConfig::keys(&["escape"])),
        "hashfile" => Some(TransformerConfig::keys(&["spread"])),
        _ => None,
    }
}

/// Open a stack with a default middleware chain for the named backend.
///
/// Recognized options, removed from the map before it reaches the
/// adapter:
/// * `expires` (bool): insert the TTL-emulation layer unless the
///   backend supports expiration natively
/// * `threadsafe` (bool): insert the lock layer, innermost
///
/// All other options pass through to the adapter verbatim. `hashfile`
/// is the file adapter with a content-hash key pipeline (entries
/// spread as `cache/42/391dd7…`). Use [`Builder`] directly for full
/// control over the chain.
pub fn open(name: &str, mut options: Options) -> Result<Stack> {
    let expires = take_flag(&mut options, "expires")?;
    let threadsafe = take_flag(&mut options, "threadsafe")?;

    let transformer = default_transformer(name);
    let adapter_name = match name {
        "hashfile" => "file",
        other => other,
    };

    let registry = std::sync::Arc::new(Registry::with_defaults());
    let native_ttl = registry.adapter_native_ttl(adapter_name)?;

    let mut builder = Builder::with_registry(registry);
    if expires && !native_ttl {
        builder = builder.layer("expires", Options::new());
    }
    if let Some(config) = transformer {
        let layer_options = match serde_json::to_value(&config) {
            Ok(Value::Object(map)) => map,
            _ => Options::new(),
        };
        builder = builder.layer("transformer", layer_options);
    }
    if threadsafe {
        builder = builder.layer("lock", Options::new());
    }

    debug!(backend = %name, expires, threadsafe, "opening stack");
    builder.adapter(adapter_name, options).build()
}
