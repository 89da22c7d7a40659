//! log module - tracing subscriber setup
//!
//! The library only emits `tracing` events; binaries call [`init_subscriber`] once at startup.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize, SmartDefault, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// "trace", "debug", "info", "warn", "error", or any `EnvFilter` directive
    #[default = "info"]
    pub level: String,

    /// `text` for terminals, `json` for log collectors
    pub format: LogFormat,

    /// Include the event's module path
    #[default = true]
    pub with_target: bool,
}

impl LogConfig {
    /// `RUST_LOG` wins over the configured level when set
    pub fn env_filter(&self) -> Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.level)
            .map_err(|e| anyhow!("invalid log level '{}': {}", self.level, e))
    }
}

/// Install the global fmt subscriber, writing to stderr
pub fn init_subscriber(config: &LogConfig) -> Result<()> {
    let filter = config.env_filter()?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_writer(std::io::stderr);

    let result = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| anyhow!("failed to init tracing subscriber: {}", e))
}
