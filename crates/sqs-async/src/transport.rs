//! HTTP transport used by the dispatcher.
//!
//! The dispatcher only needs a non-blocking `GET`; keeping it behind the
//! [`Transport`] trait lets tests count or fake network calls.

use crate::error::{ConfigurationError, TransportError, TransportErrorKind};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use std::time::Duration;
use url::Url;

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;

/// A completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Non-blocking HTTP GET
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Fetch `url`. Any HTTP status counts as a response; only failures to
    /// obtain one are errors.
    async fn get(&self, url: Url) -> Result<RawResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: HttpClient,
}

impl HttpTransport {
    /// Create a transport whose requests fail with a timeout after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ConfigurationError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigurationError::Invalid {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: Url) -> Result<RawResponse, TransportError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::new(TransportErrorKind::Timeout, format!("Request timeout: {e}"))
            } else {
                TransportError::new(
                    TransportErrorKind::Body,
                    format!("Failed to read response body: {e}"),
                )
            }
        })?;

        Ok(RawResponse { status, body })
    }
}

fn request_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::new(TransportErrorKind::Timeout, format!("Request timeout: {e}"))
    } else if e.is_connect() {
        TransportError::new(TransportErrorKind::Connect, format!("Connection failed: {e}"))
    } else {
        TransportError::new(
            TransportErrorKind::Request,
            format!("HTTP request failed: {e}"),
        )
    }
}
