//! Structured logging setup
//!
//! Strata itself only emits `tracing` events; this module wires up a
//! subscriber for binaries and tests that want one. Initialization is
//! idempotent: a second call logs a warning instead of failing, so
//! embedding applications keep control of their own subscriber.

use tracing::{warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{Result, StoreError};

/// Parse a log level string to a tracing Level
fn parse_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(StoreError::config(format!("invalid log level: {other}"))),
    }
}

/// Initialize the tracing subscriber from a logging configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_level(&config.level)?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let result = match config.format {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .try_init(),
        LogFormat::Pretty => fmt()
            .pretty()
            .with_env_filter(env_filter)
            .with_target(true)
            .try_init(),
        LogFormat::Compact => fmt()
            .compact()
            .with_env_filter(env_filter)
            .with_target(false)
            .try_init(),
    };

    if let Err(e) = result {
        warn!("Tracing subscriber already initialized: {e}");
    }
    Ok(())
}
