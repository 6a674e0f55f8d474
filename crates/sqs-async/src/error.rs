//! Error types for SQS client operations.
//!
//! Errors fall into two families that travel on different paths:
//!
//! - [`SqsError`] is raised synchronously by an operation before any network
//!   I/O happens (bad configuration, missing arguments, unimplemented actions).
//! - [`DispatchError`] is produced after a request has been handed to the
//!   runtime. It never propagates by unwinding the caller; it is delivered
//!   through the [`Dispatch`](crate::dispatch::Dispatch) future or the failure
//!   continuation, and it is always logged.

use std::fmt;
use thiserror::Error;

/// Error raised synchronously when an operation cannot be dispatched
#[derive(Debug, Error)]
pub enum SqsError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Operation not implemented: {operation}")]
    NotImplemented { operation: &'static str },
}

impl SqsError {
    /// Shorthand for a missing operation argument
    pub(crate) fn missing_argument(argument: &str) -> Self {
        Self::Configuration(ConfigurationError::MissingArgument {
            argument: argument.to_string(),
        })
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    #[error("Missing required argument: {argument}")]
    MissingArgument { argument: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parsing failed: {message}")]
    Parsing { message: String },

    #[error("No async runtime is available to dispatch the request")]
    NoRuntime,
}

/// Failure observed after a request was dispatched
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl DispatchError {
    /// Check if error is transient and the request could succeed if sent again
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Service(e) => e.status >= 500,
            Self::Transport(e) => !matches!(e.kind, TransportErrorKind::Aborted),
            Self::Parse(_) => false,
        }
    }

    /// The normalized value handed to loggers and failure continuations.
    ///
    /// Transport failures render the transport error; service failures render
    /// the raw response body.
    pub fn detail(&self) -> String {
        match self {
            Self::Service(e) if !e.body.is_empty() => e.body.clone(),
            other => other.to_string(),
        }
    }

    /// Short label for the failure family, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Service(_) => "service",
            Self::Transport(_) => "transport",
            Self::Parse(_) => "parse",
        }
    }
}

/// Service-level failure carried inside an HTTP response body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Service error (HTTP {status}): {code} - {message}")]
pub struct ServiceError {
    /// HTTP status code of the response
    pub status: u16,
    /// Error code from the envelope, or `HttpStatus` when no envelope was present
    pub code: String,
    /// Human-readable message from the envelope
    pub message: String,
    /// Request id reported by the service, if any
    pub request_id: Option<String>,
    /// Raw response body
    pub body: String,
}

/// Category of a transport-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request did not complete within the configured timeout
    Timeout,
    /// The connection could not be established (refused, DNS, TLS)
    Connect,
    /// The request failed for another reason before a response arrived
    Request,
    /// The response body could not be read
    Body,
    /// The in-flight request task was cancelled or panicked
    Aborted,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

/// Failure reported by the HTTP layer instead of a response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Transport error ({kind}): {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Errors while turning a response body into a typed value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("XML parsing error: {message}")]
    Xml { message: String },

    #[error("Element '{element}' not found in response")]
    MissingElement { element: String },

    #[error("Invalid value for '{element}': {message}")]
    InvalidValue { element: String, message: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
