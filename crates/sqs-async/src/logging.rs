//! Log destination and severity configuration.
//!
//! The library only emits `tracing` events. Applications that want the
//! client's diagnostics written somewhere call [`init_logging`] once at
//! startup; `RUST_LOG` takes precedence over the configured level.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Severity threshold, or any `EnvFilter` directive
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,

    /// Append log lines to this file instead of stderr
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
            file_path: None,
        }
    }
}

impl LoggingConfig {
    /// Build the event filter, preferring `RUST_LOG` over the configured level.
    pub fn filter(&self) -> Result<EnvFilter, ConfigurationError> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .map_err(|e| ConfigurationError::Invalid {
                message: format!("Invalid log level '{}': {}", self.level, e),
            })
    }
}

/// Install the global log subscriber described by `config`.
///
/// Fails if the level is not a valid filter, the log file cannot be opened,
/// or a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigurationError> {
    let registry = tracing_subscriber::registry().with(config.filter()?);

    let result = match &config.file_path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| ConfigurationError::Invalid {
                    message: format!("Cannot open log file {}: {}", path.display(), e),
                })?;
            let writer = Mutex::new(file);

            if config.json_format {
                registry
                    .with(fmt::layer().json().with_writer(writer))
                    .try_init()
            } else {
                registry
                    .with(fmt::layer().with_ansi(false).with_writer(writer))
                    .try_init()
            }
        }
        None if config.json_format => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        None => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| ConfigurationError::Invalid {
        message: format!("Failed to install log subscriber: {e}"),
    })
}
