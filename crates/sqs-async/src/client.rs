//! Public queue operations.
//!
//! Every operation validates its own arguments before anything is sent. A
//! missing argument, an unusable endpoint or an unimplemented operation is
//! returned as [`SqsError`] immediately; everything that happens after the
//! request is on the wire arrives through the returned [`Dispatch`].

use crate::config::ClientConfig;
use crate::dispatch::{Dispatch, Dispatcher};
use crate::error::{ParseError, SqsError};
use crate::params::RequestOptions;
use crate::response::{Message, ParseResponse, Queue, QueueAttributes};
use crate::signer::Signer;
use crate::transport::{HttpTransport, RawResponse, Transport};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use tracing::info;

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

/// Default visibility timeout, in seconds, for queues created without one
pub const DEFAULT_VISIBILITY_TIMEOUT: u32 = 30;

/// Default number of messages requested per receive
pub const DEFAULT_MAX_MESSAGES: u32 = 10;

/// Asynchronous client for the queue service's Query API.
///
/// Cloning is cheap; clones share the signer and the HTTP connection pool.
pub struct SqsClient<T: Transport = HttpTransport> {
    dispatcher: Arc<Dispatcher<T>>,
}

impl SqsClient<HttpTransport> {
    /// Create a client that talks HTTP with the configured timeout.
    pub fn new(config: ClientConfig) -> Result<Self, SqsError> {
        let transport = HttpTransport::new(config.timeout())?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> SqsClient<T> {
    /// Create a client over a custom transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, SqsError> {
        config.validate()?;
        let signer = Signer::new(&config.credentials)?;

        info!(
            region = %config.region,
            host = config.default_host(),
            scheme = config.scheme.as_str(),
            "Queue client created"
        );

        let dispatcher = Dispatcher::new(
            transport,
            signer,
            config.protocol.clone(),
            config.scheme,
            config.default_host().to_string(),
            config.expires_after()?,
        );

        Ok(Self {
            dispatcher: Arc::new(dispatcher),
        })
    }

    /// List the account's queues.
    ///
    /// `prefix` is sent to the service; `pattern` is applied here to the path
    /// of each returned queue URL.
    #[track_caller]
    pub fn list_queues(&self, mut options: RequestOptions) -> Result<Dispatch<Vec<Queue>>, SqsError> {
        let pattern = options.pattern.take();

        self.dispatcher
            .dispatch("ListQueues", options, Location::caller(), move |response| {
                let queues = Vec::<Queue>::parse(&response.body)?;
                Ok(match pattern {
                    Some(pattern) => queues
                        .into_iter()
                        .filter(|queue| pattern.is_match(queue.url().path()))
                        .collect(),
                    None => queues,
                })
            })
    }

    #[track_caller]
    pub fn create_queue(&self, mut options: RequestOptions) -> Result<Dispatch<Queue>, SqsError> {
        if !options.has("queue_name") {
            return Err(SqsError::missing_argument("queue_name"));
        }
        options.set_default("default_visibility_timeout", DEFAULT_VISIBILITY_TIMEOUT);

        self.dispatcher
            .dispatch("CreateQueue", options, Location::caller(), parse_body)
    }

    #[track_caller]
    pub fn delete_queue(&self, options: RequestOptions) -> Result<Dispatch<RawResponse>, SqsError> {
        require_queue(&options)?;

        self.dispatcher
            .dispatch("DeleteQueue", options, Location::caller(), raw_response)
    }

    /// Receive up to `MaxNumberOfMessages` messages from the target queue.
    #[track_caller]
    pub fn receive_message(
        &self,
        mut options: RequestOptions,
    ) -> Result<Dispatch<Vec<Message>>, SqsError> {
        require_queue(&options)?;
        options.set_default("max_number_of_messages", DEFAULT_MAX_MESSAGES);

        self.dispatcher
            .dispatch("ReceiveMessage", options, Location::caller(), parse_body)
    }

    /// Delete a previously received message by its receipt handle.
    ///
    /// The request goes to the target queue when one is given, otherwise to
    /// the configured endpoint.
    #[track_caller]
    pub fn delete_message(
        &self,
        mut options: RequestOptions,
    ) -> Result<Dispatch<RawResponse>, SqsError> {
        let receipt_handle = match options.message.take() {
            Some(message) => message.receipt_handle,
            None => return Err(SqsError::missing_argument("message")),
        };
        options.set("receipt_handle", receipt_handle);

        self.dispatcher
            .dispatch("DeleteMessage", options, Location::caller(), raw_response)
    }

    #[track_caller]
    pub fn get_queue_attributes(
        &self,
        mut options: RequestOptions,
    ) -> Result<Dispatch<QueueAttributes>, SqsError> {
        require_queue(&options)?;
        options.set_default("attribute_name", "All");

        self.dispatcher
            .dispatch("GetQueueAttributes", options, Location::caller(), parse_body)
    }

    #[track_caller]
    pub fn add_permission(
        &self,
        options: RequestOptions,
    ) -> Result<Dispatch<RawResponse>, SqsError> {
        require_queue(&options)?;
        require_permissions(&options)?;

        self.dispatcher
            .dispatch("AddPermission", options, Location::caller(), raw_response)
    }

    #[track_caller]
    pub fn remove_permission(
        &self,
        options: RequestOptions,
    ) -> Result<Dispatch<RawResponse>, SqsError> {
        require_queue(&options)?;
        require_permissions(&options)?;

        self.dispatcher
            .dispatch("RemovePermission", options, Location::caller(), raw_response)
    }

    /// Not supported; always fails without sending anything.
    pub fn change_message_visibility(
        &self,
        _options: RequestOptions,
    ) -> Result<Dispatch<RawResponse>, SqsError> {
        Err(SqsError::NotImplemented {
            operation: "ChangeMessageVisibility",
        })
    }

    /// Not supported; always fails without sending anything.
    pub fn set_queue_attributes(
        &self,
        _options: RequestOptions,
    ) -> Result<Dispatch<RawResponse>, SqsError> {
        Err(SqsError::NotImplemented {
            operation: "SetQueueAttributes",
        })
    }

    /// Not supported; always fails without sending anything.
    pub fn send_message(&self, _options: RequestOptions) -> Result<Dispatch<RawResponse>, SqsError> {
        Err(SqsError::NotImplemented {
            operation: "SendMessage",
        })
    }
}

impl<T: Transport> Clone for SqsClient<T> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

impl<T: Transport> fmt::Debug for SqsClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqsClient")
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

fn require_queue(options: &RequestOptions) -> Result<(), SqsError> {
    if options.queue.is_none() {
        return Err(SqsError::missing_argument("queue"));
    }
    Ok(())
}

fn require_permissions(options: &RequestOptions) -> Result<(), SqsError> {
    if !options.has("permissions") {
        return Err(SqsError::missing_argument("permissions"));
    }
    Ok(())
}

fn parse_body<R: ParseResponse>(response: RawResponse) -> Result<R, ParseError> {
    R::parse(&response.body)
}

fn raw_response(response: RawResponse) -> Result<RawResponse, ParseError> {
    Ok(response)
}
