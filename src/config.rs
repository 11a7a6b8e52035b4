//! Configuration for Strata
//!
//! A stack can be described declaratively as data (an ordered list of
//! middleware directives plus one adapter directive) and built from
//! JSON, mirroring what the [`Builder`](crate::Builder) API does in
//! code. Logging configuration lives here as well.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::builder::Builder;
use crate::error::{Result, StoreError};
use crate::registry::{Options, Registry};
use crate::stack::Stack;

/// One middleware directive: name plus opaque options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    pub name: String,
    #[serde(default)]
    pub options: Options,
}

/// The terminal adapter directive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterSpec {
    pub name: String,
    #[serde(default)]
    pub options: Options,
}

/// Declarative build description for a stack.
///
/// ```json
/// {
///   "middleware": [
///     { "name": "expires" },
///     { "name": "transformer", "options": { "key": ["escape"] } }
///   ],
///   "adapter": { "name": "file", "options": { "dir": "/var/cache/app" } }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackConfig {
    #[serde(default)]
    pub middleware: Vec<LayerSpec>,
    pub adapter: AdapterSpec,
}

impl StackConfig {
    /// Parse a build description from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| StoreError::config(format!("invalid stack config: {e}")))
    }

    /// Build the described stack over the default registry
    pub fn build(&self) -> Result<Stack> {
        self.build_with(Arc::new(Registry::with_defaults()))
    }

    /// Build the described stack over a caller-supplied registry
    pub fn build_with(&self, registry: Arc<Registry>) -> Result<Stack> {
        let mut builder = Builder::with_registry(registry);
        for layer in &self.middleware {
            builder = builder.layer(&layer.name, layer.options.clone());
        }
        builder
            .adapter(&self.adapter.name, self.adapter.options.clone())
            .build()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}
