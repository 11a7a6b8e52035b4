//! Name → factory registry for adapters and middleware
//!
//! The builder resolves symbolic names through this registry, so
//! external code extends the system by registering a new name, with no
//! change to builder, stack, or proxy logic.

use std::collections::HashMap;

use crate::error::{Result, StoreError};
use crate::middleware::{Expires, Lock, Transformer, TransformerConfig};
use crate::proxy::Proxy;
use crate::store::{FileAdapter, MemoryAdapter, NullAdapter, Store};

/// Backend/middleware-specific option map, opaque to the core and
/// passed through verbatim to factories
pub type Options = serde_json::Map<String, serde_json::Value>;

/// Factory constructing a terminal backend from its options
pub type AdapterFactory = Box<dyn Fn(&Options) -> Result<Box<dyn Store>> + Send + Sync>;

/// Factory wrapping an inner layer with a middleware, given its options
pub type MiddlewareFactory =
    Box<dyn Fn(Box<dyn Store>, &Options) -> Result<Box<dyn Store>> + Send + Sync>;

struct AdapterEntry {
    factory: AdapterFactory,
    native_ttl: bool,
}

/// Registry of adapter and middleware constructors
pub struct Registry {
    adapters: HashMap<String, AdapterEntry>,
    middleware: HashMap<String, MiddlewareFactory>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
            middleware: HashMap::new(),
        }
    }

    /// Registry with the built-in adapters (`memory`, `file`, `null`)
    /// and middleware (`transformer`, `expires`, `lock`, `proxy`)
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register_adapter("memory", false, |_options| {
            Ok(Box::new(MemoryAdapter::new()))
        });
        registry.register_adapter("file", false, |options| {
            let dir = options
                .get("dir")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    StoreError::config("file adapter requires a string 'dir' option")
                })?;
            Ok(Box::new(FileAdapter::new(dir)?))
        });
        registry.register_adapter("null", true, |_options| Ok(Box::new(NullAdapter::new())));

        registry.register_middleware("transformer", |inner, options| {
            let config: TransformerConfig =
                serde_json::from_value(serde_json::Value::Object(options.clone())).map_err(
                    |e| StoreError::config(format!("invalid transformer options: {e}")),
                )?;
            Ok(Box::new(Transformer::new(&config, inner)?))
        });
        registry.register_middleware("expires", |inner, _options| {
            Ok(Box::new(Expires::new(inner)))
        });
        registry.register_middleware("lock", |inner, _options| Ok(Box::new(Lock::new(inner))));
        registry.register_middleware("proxy", |inner, _options| Ok(Box::new(Proxy::new(inner))));

        registry
    }

    /// Register an adapter constructor under `name`. `native_ttl`
    /// advertises whether the backend honors the TTL hint itself.
    pub fn register_adapter<F>(&mut self, name: impl Into<String>, native_ttl: bool, factory: F)
    where
        F: Fn(&Options) -> Result<Box<dyn Store>> + Send + Sync + 'static,
    {
        self.adapters.insert(
            name.into(),
            AdapterEntry {
                factory: Box::new(factory),
                native_ttl,
            },
        );
    }

    /// Register a middleware constructor under `name`
    pub fn register_middleware<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(Box<dyn Store>, &Options) -> Result<Box<dyn Store>> + Send + Sync + 'static,
    {
        self.middleware.insert(name.into(), Box::new(factory));
    }

    pub fn has_adapter(&self, name: &str) -> bool {
        self.adapters.contains_key(name)
    }

    pub fn has_middleware(&self, name: &str) -> bool {
        self.middleware.contains_key(name)
    }

    /// Whether the named adapter advertises native TTL support
    pub fn adapter_native_ttl(&self, name: &str) -> Result<bool> {
        self.adapters
            .get(name)
            .map(|entry| entry.native_ttl)
            .ok_or_else(|| StoreError::UnknownAdapter(name.to_string()))
    }

    /// Construct the named adapter
    pub fn build_adapter(&self, name: &str, options: &Options) -> Result<Box<dyn Store>> {
        let entry = self
            .adapters
            .get(name)
            .ok_or_else(|| StoreError::UnknownAdapter(name.to_string()))?;
        (entry.factory)(options)
    }

    /// Construct the named middleware around `inner`
    pub fn build_middleware(
        &self,
        name: &str,
        inner: Box<dyn Store>,
        options: &Options,
    ) -> Result<Box<dyn Store>> {
        let factory = self
            .middleware
            .get(name)
            .ok_or_else(|| StoreError::UnknownMiddleware(name.to_string()))?;
        factory(inner, options)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
