//! Client configuration.
//!
//! Configuration is an explicit value handed to the client at construction
//! time. It can be built in code, or loaded with [`ClientConfig::load`] from
//! (in order, later sources override earlier ones):
//!
//!  1. an optional YAML or TOML file;
//!  2. environment variables prefixed `SQS__` with `__` as the separator,
//!     e.g. `SQS__CREDENTIALS__ACCESS_KEY_ID` or `SQS__REGION=eu`.
//!
//! Every field has a default, so only the credentials are required in
//! practice.

use crate::error::ConfigurationError;
use crate::logging::LoggingConfig;
use crate::region::{ProtocolParameters, Region, Scheme};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Access key and secret used to sign requests
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<REDACTED>")
            .finish()
    }
}

/// Upper bound for `expires_after_seconds` (seven days)
pub const MAX_EXPIRES_AFTER_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Configuration for [`SqsClient`](crate::client::SqsClient)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub credentials: Credentials,

    /// Region used when a call targets neither a queue nor a host
    pub region: Region,

    /// Host (optionally with port) used instead of the region's host
    pub host: Option<String>,

    /// Scheme for region and host endpoints; queue URLs keep their own
    pub scheme: Scheme,

    /// HTTP timeout in seconds; expiry surfaces as a transport error
    pub timeout_seconds: u64,

    /// How far in the future the `Expires` parameter is set
    pub expires_after_seconds: i64,

    pub protocol: ProtocolParameters,

    pub logging: LoggingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            region: Region::default(),
            host: None,
            scheme: Scheme::default(),
            timeout_seconds: 30,
            expires_after_seconds: 30 * 60,
            protocol: ProtocolParameters::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration with the given credentials and defaults elsewhere.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            ..Self::default()
        }
    }

    /// Load configuration from an optional file and `SQS__` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder
            .add_source(config::Environment::with_prefix("SQS").separator("__"))
            .build()
            .and_then(|settings| settings.try_deserialize::<ClientConfig>())
            .map_err(|e| ConfigurationError::Parsing {
                message: e.to_string(),
            })
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_seconds = timeout.as_secs();
        self
    }

    pub fn with_protocol(mut self, protocol: ProtocolParameters) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Validity window of a signed request
    pub fn expires_after(&self) -> Result<chrono::Duration, ConfigurationError> {
        chrono::Duration::try_seconds(self.expires_after_seconds).ok_or_else(|| {
            ConfigurationError::Invalid {
                message: format!(
                    "expires_after_seconds is out of range: {}",
                    self.expires_after_seconds
                ),
            }
        })
    }

    /// Host used when a call names no queue and no host of its own
    pub fn default_host(&self) -> &str {
        self.host.as_deref().unwrap_or_else(|| self.region.host())
    }

    /// Check the settings the client cannot work without.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigurationError::Invalid {
                message: "timeout_seconds must be greater than zero".to_string(),
            });
        }
        if self.expires_after_seconds <= 0 {
            return Err(ConfigurationError::Invalid {
                message: "expires_after_seconds must be greater than zero".to_string(),
            });
        }
        if self.expires_after_seconds > MAX_EXPIRES_AFTER_SECONDS {
            return Err(ConfigurationError::Invalid {
                message: format!(
                    "expires_after_seconds cannot exceed {MAX_EXPIRES_AFTER_SECONDS}"
                ),
            });
        }
        if self.protocol.version.is_empty() || self.protocol.signature_version.is_empty() {
            return Err(ConfigurationError::Invalid {
                message: "protocol version and signature version cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
