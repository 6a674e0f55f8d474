//! # SQS Async
//!
//! Non-blocking client for the 2009-02-01 SQS Query API.
//!
//! This library provides:
//! - Signature version 2 request signing (HmacSHA256 or HmacSHA1)
//! - Deterministic query-string canonicalization
//! - Region endpoint registry
//! - Requests dispatched on the tokio runtime, with each outcome routed to
//!   exactly one of success or failure
//! - Classification and logging of transport and service errors
//!
//! ## Module Organization
//!
//! - [`params`] - Request options and canonical query strings
//! - [`signer`] - Request signing
//! - [`region`] - Regions, endpoints and protocol parameters
//! - [`dispatch`] - Dispatch handles and callbacks
//! - [`classify`] - Outcome classification
//! - [`client`] - Public queue operations
//! - [`response`] - Response body parsing
//! - [`config`] / [`logging`] - Client configuration and log setup
//!
//! ## Example
//!
//! ```no_run
//! use sqs_async::{ClientConfig, Credentials, RequestOptions, SqsClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new(Credentials::new("AKIDEXAMPLE", "secret"));
//! let client = SqsClient::new(config)?;
//!
//! let queue = client
//!     .create_queue(RequestOptions::new().queue_name("orders"))?
//!     .await?;
//! let messages = client
//!     .receive_message(RequestOptions::new().queue(queue))?
//!     .await?;
//! println!("received {} messages", messages.len());
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod params;
pub mod region;
pub mod response;
pub mod signer;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use client::SqsClient;
pub use config::{ClientConfig, Credentials};
pub use dispatch::{Callbacks, Dispatch};
pub use error::{
    ConfigurationError, DispatchError, ParseError, ServiceError, SqsError, TransportError,
    TransportErrorKind,
};
pub use logging::{init_logging, LoggingConfig};
pub use params::{OptionValue, Permission, RequestOptions};
pub use region::{Endpoint, ProtocolParameters, Region, Scheme};
pub use response::{Message, ParseResponse, Queue, QueueAttributes};
pub use signer::{SignatureMethod, Signer};
pub use transport::{HttpTransport, RawResponse, Transport};
