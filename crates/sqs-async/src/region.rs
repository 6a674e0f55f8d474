//! Regions, endpoints and protocol parameters.

use crate::error::ConfigurationError;
use crate::response::Queue;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

#[cfg(test)]
#[path = "region_tests.rs"]
mod tests;

/// Service regions the client knows the endpoint of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    #[default]
    UsEast,
    UsWest,
    Eu,
    AsiaSingapore,
    AsiaTokyo,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Self::UsEast,
        Self::UsWest,
        Self::Eu,
        Self::AsiaSingapore,
        Self::AsiaTokyo,
    ];

    /// Symbolic key used in configuration
    pub fn key(&self) -> &'static str {
        match self {
            Self::UsEast => "us_east",
            Self::UsWest => "us_west",
            Self::Eu => "eu",
            Self::AsiaSingapore => "asia_singapore",
            Self::AsiaTokyo => "asia_tokyo",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::UsEast => "US-East (Northern Virginia) Region",
            Self::UsWest => "US-West (Northern California) Region",
            Self::Eu => "EU (Ireland) Region",
            Self::AsiaSingapore => "Asia Pacific (Singapore) Region",
            Self::AsiaTokyo => "Asia Pacific (Tokyo) Region",
        }
    }

    /// API hostname for the region
    pub fn host(&self) -> &'static str {
        match self {
            Self::UsEast => "sqs.us-east-1.amazonaws.com",
            Self::UsWest => "sqs.us-west-1.amazonaws.com",
            Self::Eu => "sqs.eu-west-1.amazonaws.com",
            Self::AsiaSingapore => "sqs.ap-southeast-1.amazonaws.com",
            Self::AsiaTokyo => "sqs.ap-northeast-1.amazonaws.com",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Region {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|region| region.key() == s)
            .ok_or_else(|| ConfigurationError::Invalid {
                message: format!("Unknown region: {s}"),
            })
    }
}

/// URL scheme used for region and host endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// Where a single request is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// The resource URL of an existing queue
    Queue(Url),
    /// `scheme://host` of a region or an explicit host override
    Host { scheme: Scheme, host: String },
}

impl Endpoint {
    /// Resolve the endpoint for one call.
    ///
    /// A target queue wins over a per-call host, which wins over `default_host`.
    pub fn resolve(
        queue: Option<&Queue>,
        host: Option<&str>,
        scheme: Scheme,
        default_host: &str,
    ) -> Self {
        match (queue, host) {
            (Some(queue), _) => Self::Queue(queue.url().clone()),
            (None, Some(host)) => Self::Host {
                scheme,
                host: host.to_string(),
            },
            (None, None) => Self::Host {
                scheme,
                host: default_host.to_string(),
            },
        }
    }

    pub fn to_url(&self) -> Result<Url, ConfigurationError> {
        match self {
            Self::Queue(url) => Ok(url.clone()),
            Self::Host { scheme, host } => Url::parse(&format!("{}://{}", scheme.as_str(), host))
                .map_err(|e| ConfigurationError::Invalid {
                    message: format!("Invalid endpoint host '{host}': {e}"),
                }),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queue(url) => write!(f, "{url}"),
            Self::Host { scheme, host } => write!(f, "{}://{}", scheme.as_str(), host),
        }
    }
}

/// Protocol parameters sent and signed with every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolParameters {
    pub version: String,
    pub signature_version: String,
    pub signature_method: String,
}

impl Default for ProtocolParameters {
    fn default() -> Self {
        Self {
            version: "2009-02-01".to_string(),
            signature_version: "2".to_string(),
            signature_method: "HmacSHA256".to_string(),
        }
    }
}

impl ProtocolParameters {
    /// The default parameter set for one request, keyed by wire name.
    pub fn to_params(&self, access_key_id: &str, expires: DateTime<Utc>) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("Version".to_string(), self.version.clone()),
            ("SignatureVersion".to_string(), self.signature_version.clone()),
            ("SignatureMethod".to_string(), self.signature_method.clone()),
            ("AWSAccessKeyId".to_string(), access_key_id.to_string()),
            ("Expires".to_string(), format_timestamp(expires)),
        ])
    }
}

/// ISO-8601 UTC with whole seconds, e.g. `2009-02-01T12:30:00Z`
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
