//! Declarative stack assembly
//!
//! The builder accumulates an ordered list of middleware directives
//! plus exactly one adapter directive, then constructs the chain
//! bottom-up: the adapter first, then each middleware in reverse
//! declaration order, so the first declared layer is the outermost:
//! first declared, first to see every call.

use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::registry::{Options, Registry};
use crate::stack::Stack;

/// Builder for a [`Stack`]
///
/// ```
/// use strata::{Builder, Options};
///
/// let stack = Builder::new()
///     .layer("expires", Options::new())
///     .layer("lock", Options::new())
///     .adapter("memory", Options::new())
///     .build()
///     .unwrap();
/// assert_eq!(stack.layers(), ["expires", "lock"]);
/// ```
pub struct Builder {
    registry: Arc<Registry>,
    layers: Vec<(String, Options)>,
    adapters: Vec<(String, Options)>,
}

impl Builder {
    /// Builder over the default registry
    pub fn new() -> Self {
        Self::with_registry(Arc::new(Registry::with_defaults()))
    }

    /// Builder over a caller-supplied registry (for externally
    /// registered adapters and middleware)
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            layers: Vec::new(),
            adapters: Vec::new(),
        }
    }

    /// Append a middleware directive. Declaration order is chain order:
    /// the first layer declared wraps everything declared after it.
    pub fn layer(mut self, name: impl Into<String>, options: Options) -> Self {
        self.layers.push((name.into(), options));
        self
    }

    /// Declare the terminal adapter. Exactly one adapter directive must
    /// be present per build; a second call is a build-time error, not a
    /// replacement.
    pub fn adapter(mut self, name: impl Into<String>, options: Options) -> Self {
        self.adapters.push((name.into(), options));
        self
    }

    /// Validate the directives and construct the stack.
    ///
    /// All names are resolved before anything is instantiated, so an
    /// unknown name or a missing/duplicate adapter is reported without
    /// side effects.
    pub fn build(self) -> Result<Stack> {
        let (adapter_name, adapter_options) = match self.adapters.as_slice() {
            [one] => one,
            [] => {
                return Err(StoreError::config(
                    "exactly one adapter directive is required, got none",
                ))
            }
            many => {
                return Err(StoreError::config(format!(
                    "exactly one adapter directive is required, got {}",
                    many.len()
                )))
            }
        };

        if !self.registry.has_adapter(adapter_name) {
            return Err(StoreError::UnknownAdapter(adapter_name.clone()));
        }
        for (name, _) in &self.layers {
            if !self.registry.has_middleware(name) {
                return Err(StoreError::UnknownMiddleware(name.clone()));
            }
        }

        let mut chain = self.registry.build_adapter(adapter_name, adapter_options)?;
        for (name, options) in self.layers.iter().rev() {
            chain = self.registry.build_middleware(name, chain, options)?;
        }

        let layer_names: Vec<String> = self.layers.into_iter().map(|(name, _)| name).collect();
        debug!(adapter = %adapter_name, layers = ?layer_names, "built stack");

        Ok(Stack::new(chain, layer_names, adapter_name.clone()))
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
