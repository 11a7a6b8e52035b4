//! Codec stages and the transformation pipeline
//!
//! A codec stage is a named byte-to-byte transformation with an encode
//! direction and, for reversible stages, a decode direction. Pipelines
//! compose stages left-to-right on encode and right-to-left on decode.
//!
//! One-way stages (content hashing) have no decode direction. The
//! pipeline constructors enforce where they may appear: never on the
//! value side, and only in terminal position on the key side, since
//! encoded keys are used purely as lookup tokens and are never
//! reconstructed.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, StoreError};

/// A single named, byte-to-byte codec transformation
pub trait CodecStage: Send + Sync {
    /// Stage name as used in transformer configuration
    fn name(&self) -> &'static str;

    /// Apply the forward transformation
    fn encode(&self, input: &[u8]) -> Result<Bytes>;

    /// Apply the inverse transformation.
    ///
    /// One-way stages return a `Decode` error; they are excluded from
    /// read paths by pipeline validation instead.
    fn decode(&self, input: &[u8]) -> Result<Bytes>;

    /// Whether this stage has a decode direction
    fn reversible(&self) -> bool {
        true
    }
}

/// Serialize-to-bytes framing via JSON.
///
/// Wraps the raw bytes in a JSON value so foreign or corrupt data in
/// the backend is detected on decode rather than returned verbatim.
pub struct JsonStage;

impl CodecStage for JsonStage {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, input: &[u8]) -> Result<Bytes> {
        let encoded = serde_json::to_vec(input).map_err(|e| StoreError::Encode {
            stage: "json".to_string(),
            message: e.to_string(),
        })?;
        Ok(Bytes::from(encoded))
    }

    fn decode(&self, input: &[u8]) -> Result<Bytes> {
        let decoded: Vec<u8> = serde_json::from_slice(input).map_err(|e| StoreError::Decode {
            stage: "json".to_string(),
            message: e.to_string(),
        })?;
        Ok(Bytes::from(decoded))
    }
}

/// Standard-alphabet base64, for backends restricted to text-safe data
pub struct Base64Stage;

impl CodecStage for Base64Stage {
    fn name(&self) -> &'static str {
        "base64"
    }

    fn encode(&self, input: &[u8]) -> Result<Bytes> {
        Ok(Bytes::from(BASE64.encode(input).into_bytes()))
    }

    fn decode(&self, input: &[u8]) -> Result<Bytes> {
        let decoded = BASE64.decode(input).map_err(|e| StoreError::Decode {
            stage: "base64".to_string(),
            message: e.to_string(),
        })?;
        Ok(Bytes::from(decoded))
    }
}

/// Percent-style escaping of bytes unsafe in file names.
///
/// Bytes outside `[A-Za-z0-9._-]` become `%XX`. The output is plain
/// ASCII with no path separators, which makes any key safe for the
/// file adapter.
pub struct EscapeStage;

impl EscapeStage {
    fn is_safe(byte: u8) -> bool {
        byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-')
    }
}

impl CodecStage for EscapeStage {
    fn name(&self) -> &'static str {
        "escape"
    }

    fn encode(&self, input: &[u8]) -> Result<Bytes> {
        let mut out = Vec::with_capacity(input.len());
        for &byte in input {
            if Self::is_safe(byte) {
                out.push(byte);
            } else {
                out.extend_from_slice(format!("%{byte:02X}").as_bytes());
            }
        }
        Ok(Bytes::from(out))
    }

    fn decode(&self, input: &[u8]) -> Result<Bytes> {
        let mut out = Vec::with_capacity(input.len());
        let mut i = 0;
        while i < input.len() {
            match input[i] {
                b'%' => {
                    let hex = input.get(i + 1..i + 3).ok_or_else(|| StoreError::Decode {
                        stage: "escape".to_string(),
                        message: "truncated escape sequence".to_string(),
                    })?;
                    let mut byte = [0u8; 1];
                    hex::decode_to_slice(hex, &mut byte).map_err(|e| StoreError::Decode {
                        stage: "escape".to_string(),
                        message: e.to_string(),
                    })?;
                    out.push(byte[0]);
                    i += 3;
                }
                byte => {
                    out.push(byte);
                    i += 1;
                }
            }
        }
        Ok(Bytes::from(out))
    }
}

/// Content hash with path spreading: SHA-256 hex split as `ab/cdef…`.
///
/// One-way. The hash is used purely as a lookup token, so reads look
/// the encoded key up directly and never decode it; spreading the
/// first byte into a subdirectory keeps file-backed stores from piling
/// every entry into one directory.
pub struct SpreadStage;

impl CodecStage for SpreadStage {
    fn name(&self) -> &'static str {
        "spread"
    }

    fn encode(&self, input: &[u8]) -> Result<Bytes> {
        let digest = hex::encode(Sha256::digest(input));
        let spread = format!("{}/{}", &digest[..2], &digest[2..]);
        Ok(Bytes::from(spread.into_bytes()))
    }

    fn decode(&self, _input: &[u8]) -> Result<Bytes> {
        Err(StoreError::Decode {
            stage: "spread".to_string(),
            message: "content hashes cannot be decoded".to_string(),
        })
    }

    fn reversible(&self) -> bool {
        false
    }
}

/// Resolve a stage name to its implementation
pub fn stage_by_name(name: &str) -> Result<Arc<dyn CodecStage>> {
    match name {
        "json" => Ok(Arc::new(JsonStage)),
        "base64" => Ok(Arc::new(Base64Stage)),
        "escape" => Ok(Arc::new(EscapeStage)),
        "spread" => Ok(Arc::new(SpreadStage)),
        other => Err(StoreError::UnknownStage(other.to_string())),
    }
}

/// Which side of an entry a pipeline transforms, controlling which
/// validation rules apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineSide {
    Key,
    Value,
}

/// An ordered sequence of codec stages.
///
/// For stages `[A, B, C]`, `encode` applies A then B then C and
/// `decode` applies the inverse of C then B then A.
pub struct Pipeline {
    stages: Vec<Arc<dyn CodecStage>>,
}

impl Pipeline {
    /// Build a pipeline from stage names, enforcing the side rules:
    /// value pipelines must be fully reversible, and a key pipeline may
    /// contain a one-way stage only as its last step.
    pub fn from_names(names: &[String], side: PipelineSide) -> Result<Self> {
        let stages = names
            .iter()
            .map(|name| stage_by_name(name))
            .collect::<Result<Vec<_>>>()?;

        for (index, stage) in stages.iter().enumerate() {
            if stage.reversible() {
                continue;
            }
            match side {
                PipelineSide::Value => {
                    return Err(StoreError::config(format!(
                        "one-way stage '{}' is not allowed in a value pipeline",
                        stage.name()
                    )));
                }
                PipelineSide::Key if index + 1 != stages.len() => {
                    return Err(StoreError::config(format!(
                        "one-way stage '{}' must be the last key pipeline stage",
                        stage.name()
                    )));
                }
                PipelineSide::Key => {}
            }
        }

        Ok(Self { stages })
    }

    /// Stage names, in declaration order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Apply all stages in declaration order
    pub fn encode(&self, raw: &[u8]) -> Result<Bytes> {
        let mut current = Bytes::copy_from_slice(raw);
        for stage in &self.stages {
            current = stage.encode(&current)?;
        }
        Ok(current)
    }

    /// Apply all stage inverses in reverse declaration order
    pub fn decode(&self, encoded: &[u8]) -> Result<Bytes> {
        let mut current = Bytes::copy_from_slice(encoded);
        for stage in self.stages.iter().rev() {
            current = stage.decode(&current)?;
        }
        Ok(current)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}
