//! Key/value codec middleware

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

use crate::codec::{Pipeline, PipelineSide};
use crate::error::Result;
use crate::store::Store;

/// Pipeline declaration for one side of an entry: a single stage name
/// or an ordered list of them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StageList {
    One(String),
    Many(Vec<String>),
}

impl StageList {
    fn names(&self) -> Vec<String> {
        match self {
            StageList::One(name) => vec![name.clone()],
            StageList::Many(names) => names.clone(),
        }
    }
}

/// Declarative transformer configuration, deserializable from the
/// middleware options map: `{ "key": ["escape"], "value": ["json", "base64"] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformerConfig {
    #[serde(default)]
    pub key: Option<StageList>,
    #[serde(default)]
    pub value: Option<StageList>,
}

impl TransformerConfig {
    /// Configuration with a key pipeline only
    pub fn keys(stages: &[&str]) -> Self {
        Self {
            key: Some(StageList::Many(
                stages.iter().map(|s| s.to_string()).collect(),
            )),
            value: None,
        }
    }

    /// Configuration with a value pipeline only
    pub fn values(stages: &[&str]) -> Self {
        Self {
            key: None,
            value: Some(StageList::Many(
                stages.iter().map(|s| s.to_string()).collect(),
            )),
        }
    }

    /// Configuration with both pipelines
    pub fn keys_and_values(key_stages: &[&str], value_stages: &[&str]) -> Self {
        Self {
            key: Self::keys(key_stages).key,
            value: Self::values(value_stages).value,
        }
    }
}

/// Middleware that encodes keys and values on the way in and decodes
/// values on the way out, delegating storage to the inner layer.
///
/// Keys are never read back through the pipeline: encoded keys are
/// lookup tokens, which is what permits a one-way terminal stage on
/// the key side.
pub struct Transformer {
    key_pipeline: Option<Pipeline>,
    value_pipeline: Option<Pipeline>,
    inner: Box<dyn Store>,
}

impl Transformer {
    /// Build the pipelines from `config` and wrap `inner`.
    ///
    /// Fails with a configuration error when a stage name is unknown,
    /// when the value pipeline contains a one-way stage, or when a
    /// one-way key stage is not terminal.
    pub fn new(config: &TransformerConfig, inner: Box<dyn Store>) -> Result<Self> {
        let key_pipeline = config
            .key
            .as_ref()
            .map(|list| Pipeline::from_names(&list.names(), PipelineSide::Key))
            .transpose()?;
        let value_pipeline = config
            .value
            .as_ref()
            .map(|list| Pipeline::from_names(&list.names(), PipelineSide::Value))
            .transpose()?;

        Ok(Self {
            key_pipeline,
            value_pipeline,
            inner,
        })
    }

    fn encode_key(&self, key: &[u8]) -> Result<Bytes> {
        match &self.key_pipeline {
            Some(pipeline) => pipeline.encode(key),
            None => Ok(Bytes::copy_from_slice(key)),
        }
    }

    fn encode_value(&self, value: &Bytes) -> Result<Bytes> {
        match &self.value_pipeline {
            Some(pipeline) => pipeline.encode(value),
            None => Ok(value.clone()),
        }
    }

    fn decode_value(&self, stored: &Bytes) -> Result<Bytes> {
        match &self.value_pipeline {
            Some(pipeline) => pipeline.decode(stored),
            None => Ok(stored.clone()),
        }
    }
}

#[async_trait]
impl Store for Transformer {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        let encoded_key = self.encode_key(key)?;
        match self.inner.get(&encoded_key).await? {
            // A decode failure here is corrupt or foreign data and
            // surfaces as an error, never as absence.
            Some(stored) => Ok(Some(self.decode_value(&stored)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &[u8], value: Bytes, ttl: Option<Duration>) -> Result<()> {
        let encoded_key = self.encode_key(key)?;
        let encoded_value = self.encode_value(&value)?;
        trace!(
            raw_key_len = key.len(),
            encoded_key_len = encoded_key.len(),
            "transformed entry"
        );
        self.inner.set(&encoded_key, encoded_value, ttl).await
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        let encoded_key = self.encode_key(key)?;
        self.inner.delete(&encoded_key).await
    }

    async fn clear(&self) -> Result<()> {
        self.inner.clear().await
    }

    async fn exists(&self, key: &[u8]) -> Result<bool> {
        let encoded_key = self.encode_key(key)?;
        self.inner.exists(&encoded_key).await
    }

    fn supports_ttl(&self) -> bool {
        self.inner.supports_ttl()
    }
}
