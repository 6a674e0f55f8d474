//! Outcome classification and failure logging.
//!
//! A finished request is classified in this order:
//!
//! 1. the transport reported a failure: transport error;
//! 2. the body carries an `<ErrorResponse>` envelope: service error, whatever
//!    the HTTP status;
//! 3. the status is not 2xx: service error with code `HttpStatus`;
//! 4. otherwise the response is a success.
//!
//! Every failure is written as a single `ERROR` event that carries the call
//! site, a bounded backtrace and the normalized failure value.

use crate::error::{DispatchError, ServiceError, TransportError};
use crate::response::ErrorEnvelope;
use crate::transport::RawResponse;
use regex::Regex;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::Location;
use std::sync::OnceLock;
use tracing::error;

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;

/// Maximum backtrace frames included in a failure log entry
const MAX_BACKTRACE_FRAMES: usize = 8;

const SEPARATOR_WIDTH: usize = 80;

fn error_envelope_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)<ErrorResponse[\s>]").expect("error envelope pattern is valid")
    })
}

/// Whether `body` contains a service error envelope
pub fn is_error_envelope(body: &str) -> bool {
    error_envelope_pattern().is_match(body)
}

/// Sort a transport outcome into success or failure.
pub fn classify(outcome: Result<RawResponse, TransportError>) -> Result<RawResponse, DispatchError> {
    let response = outcome?;

    if is_error_envelope(&response.body) {
        let envelope = ErrorEnvelope::parse(&response.body);
        return Err(ServiceError {
            status: response.status,
            code: envelope.code.unwrap_or_else(|| "Unknown".to_string()),
            message: envelope
                .message
                .unwrap_or_else(|| "Unknown error".to_string()),
            request_id: envelope.request_id,
            body: response.body,
        }
        .into());
    }

    if !response.is_success() {
        return Err(ServiceError {
            status: response.status,
            code: "HttpStatus".to_string(),
            message: format!("Unexpected HTTP status {}", response.status),
            request_id: None,
            body: response.body,
        }
        .into());
    }

    Ok(response)
}

/// Where a request came from, kept for the failure log
#[derive(Debug)]
pub(crate) struct CallContext {
    pub action: &'static str,
    pub endpoint: String,
    pub location: &'static Location<'static>,
    backtrace: Backtrace,
}

impl CallContext {
    /// Capture the context at the caller's side of the dispatch.
    ///
    /// The backtrace is only collected when `RUST_BACKTRACE` or
    /// `RUST_LIB_BACKTRACE` enables it.
    pub fn capture(
        action: &'static str,
        endpoint: String,
        location: &'static Location<'static>,
    ) -> Self {
        Self {
            action,
            endpoint,
            location,
            backtrace: Backtrace::capture(),
        }
    }

    fn backtrace_frames(&self) -> Vec<String> {
        if self.backtrace.status() != BacktraceStatus::Captured {
            return Vec::new();
        }

        // Each frame renders as a numbered symbol line, optionally followed by
        // an indented "at file:line" line.
        let mut frames: Vec<String> = Vec::new();
        for line in self.backtrace.to_string().lines() {
            let trimmed = line.trim();
            if trimmed.starts_with("at ") {
                if let Some(frame) = frames.last_mut() {
                    frame.push(' ');
                    frame.push_str(trimmed);
                }
            } else if frames.len() < MAX_BACKTRACE_FRAMES {
                frames.push(trimmed.to_string());
            } else {
                break;
            }
        }
        frames
    }
}

/// Render the log entry for a failed request.
pub(crate) fn format_failure(context: &CallContext, failure: &DispatchError) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut lines = vec![
        "SERVICE ERROR".to_string(),
        format!("\t{} {}", context.action, context.endpoint),
        format!("\tcalled at {}", context.location),
    ];
    lines.extend(
        context
            .backtrace_frames()
            .into_iter()
            .map(|frame| format!("\t{frame}")),
    );
    lines.push(separator.clone());
    lines.push(failure.detail());
    lines.push(separator);
    lines.join("\n")
}

/// Log `failure` once at error severity.
pub(crate) fn log_failure(context: &CallContext, failure: &DispatchError) {
    error!(
        action = context.action,
        endpoint = %context.endpoint,
        kind = failure.kind(),
        transient = failure.is_transient(),
        "{}",
        format_failure(context, failure)
    );
}
