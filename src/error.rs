//! Error types and handling for Strata
//!
//! This module defines all error types used throughout the system.
//! Configuration errors are raised at build time, before any store
//! operation executes; codec and backend errors are raised per
//! operation. A missing key is never an error; absence is reported
//! as `Ok(None)` by the store contract.

use thiserror::Error;

/// Main error type for Strata operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unknown adapter: {0}")]
    UnknownAdapter(String),

    #[error("Unknown middleware: {0}")]
    UnknownMiddleware(String),

    #[error("Unknown codec stage: {0}")]
    UnknownStage(String),

    #[error("Encode failed in stage '{stage}': {message}")]
    Encode { stage: String, message: String },

    #[error("Decode failed in stage '{stage}': {message}")]
    Decode { stage: String, message: String },

    #[error("Adapter '{adapter}' has no native expiration support")]
    TtlUnsupported { adapter: String },

    #[error("Invalid key: {message}")]
    InvalidKey { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Shorthand for a build-time configuration error
    pub fn config(message: impl Into<String>) -> Self {
        StoreError::Config {
            message: message.into(),
        }
    }

    /// Check if the error was raised at build time rather than during
    /// a store operation
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            StoreError::Config { .. }
                | StoreError::UnknownAdapter(_)
                | StoreError::UnknownMiddleware(_)
                | StoreError::UnknownStage(_)
        )
    }

    /// Check if the error is a codec failure (corrupt or foreign data,
    /// or an unencodable input)
    pub fn is_codec_error(&self) -> bool {
        matches!(self, StoreError::Encode { .. } | StoreError::Decode { .. })
    }
}
