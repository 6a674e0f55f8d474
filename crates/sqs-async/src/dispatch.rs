//! Asynchronous request dispatch.
//!
//! [`Dispatcher::dispatch`] does all fallible preparation synchronously:
//! endpoint resolution, canonicalization and signing. It then spawns the HTTP
//! call on the current tokio runtime and returns a [`Dispatch`] handle right
//! away. The spawned task resolves to exactly one outcome:
//!
//! - `Ok(value)`: the response carried no error and the transform accepted it;
//! - `Err(DispatchError)`: transport failure, service error or parse failure,
//!   logged once before it is returned.
//!
//! Callers either await the handle or attach [`Callbacks`] with
//! [`Dispatch::then`].

use crate::classify::{classify, log_failure, CallContext};
use crate::error::{
    ConfigurationError, DispatchError, ParseError, SqsError, TransportError, TransportErrorKind,
};
use crate::params::{merge_parameters, RequestOptions};
use crate::region::{Endpoint, ProtocolParameters, Scheme};
use crate::signer::Signer;
use crate::transport::{RawResponse, Transport};
use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use std::fmt;
use std::future::Future;
use std::panic::Location;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;
use url::Url;

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;

/// Handle to an in-flight request.
///
/// Awaiting it yields the request's single outcome. Dropping it does not
/// cancel the request; the outcome is still classified and failures are
/// still logged.
pub struct Dispatch<T> {
    handle: JoinHandle<Result<T, DispatchError>>,
    runtime: Handle,
    context: Arc<CallContext>,
}

impl<T: Send + 'static> Dispatch<T> {
    /// Deliver the outcome to `callbacks` instead of awaiting it.
    ///
    /// Exactly one of the two continuations is considered: success on `Ok`,
    /// failure on `Err`. A missing continuation means the outcome is dropped;
    /// failures have already been logged by then.
    ///
    /// ```
    /// use sqs_async::{Callbacks, ClientConfig, Credentials, Queue, RequestOptions, Scheme, SqsClient};
    ///
    /// # tokio_test::block_on(async {
    /// let config = ClientConfig::new(Credentials::new("AKIDEXAMPLE", "secret"))
    ///     .with_scheme(Scheme::Http)
    ///     .with_host("127.0.0.1:1");
    /// let client = SqsClient::new(config).unwrap();
    ///
    /// client
    ///     .list_queues(RequestOptions::new())
    ///     .unwrap()
    ///     .then(
    ///         Callbacks::new()
    ///             .on_success(|queues: Vec<Queue>| println!("{} queues", queues.len()))
    ///             .on_failure(|failure| eprintln!("list failed: {failure}")),
    ///     )
    ///     .await
    ///     .unwrap();
    /// # });
    /// ```
    pub fn then(self, callbacks: Callbacks<T>) -> JoinHandle<()> {
        let runtime = self.runtime.clone();
        runtime.spawn(async move {
            let outcome = self.await;
            callbacks.resolve(outcome);
        })
    }
}

impl<T> Future for Dispatch<T> {
    type Output = Result<T, DispatchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match ready!(Pin::new(&mut self.handle).poll(cx)) {
            Ok(outcome) => Poll::Ready(outcome),
            Err(join_error) => {
                // The task never reached its own failure logging.
                let failure: DispatchError = TransportError::new(
                    TransportErrorKind::Aborted,
                    format!("Request task did not complete: {join_error}"),
                )
                .into();
                log_failure(&self.context, &failure);
                Poll::Ready(Err(failure))
            }
        }
    }
}

impl<T> fmt::Debug for Dispatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("action", &self.context.action)
            .field("finished", &self.handle.is_finished())
            .finish()
    }
}

type SuccessFn<T> = Box<dyn FnOnce(T) + Send>;
type FailureFn = Box<dyn FnOnce(DispatchError) + Send>;

/// Optional success and failure continuations for one request
pub struct Callbacks<T> {
    success: Option<SuccessFn<T>>,
    failure: Option<FailureFn>,
}

impl<T> Callbacks<T> {
    pub fn new() -> Self {
        Self {
            success: None,
            failure: None,
        }
    }

    pub fn on_success(mut self, success: impl FnOnce(T) + Send + 'static) -> Self {
        self.success = Some(Box::new(success));
        self
    }

    pub fn on_failure(mut self, failure: impl FnOnce(DispatchError) + Send + 'static) -> Self {
        self.failure = Some(Box::new(failure));
        self
    }

    /// Invoke the continuation matching `outcome`, consuming both.
    pub fn resolve(self, outcome: Result<T, DispatchError>) {
        match outcome {
            Ok(value) => {
                if let Some(success) = self.success {
                    success(value);
                }
            }
            Err(failure) => {
                if let Some(on_failure) = self.failure {
                    on_failure(failure);
                }
            }
        }
    }
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Callbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("success", &self.success.is_some())
            .field("failure", &self.failure.is_some())
            .finish()
    }
}

/// Signs and issues requests over a [`Transport`]
pub(crate) struct Dispatcher<T: Transport> {
    transport: Arc<T>,
    signer: Signer,
    protocol: ProtocolParameters,
    scheme: Scheme,
    default_host: String,
    expires_after: Duration,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(
        transport: T,
        signer: Signer,
        protocol: ProtocolParameters,
        scheme: Scheme,
        default_host: String,
        expires_after: Duration,
    ) -> Self {
        Self {
            transport: Arc::new(transport),
            signer,
            protocol,
            scheme,
            default_host,
            expires_after,
        }
    }

    /// Resolve, sign and spawn one `GET` request for `action`.
    ///
    /// `transform` turns a successful response into the caller's value; its
    /// errors take the failure path like any other.
    pub fn dispatch<R, F>(
        &self,
        action: &'static str,
        mut options: RequestOptions,
        location: &'static Location<'static>,
        transform: F,
    ) -> Result<Dispatch<R>, SqsError>
    where
        R: Send + 'static,
        F: FnOnce(RawResponse) -> Result<R, ParseError> + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| ConfigurationError::NoRuntime)?;

        options.set("Action", action);
        let endpoint = Endpoint::resolve(
            options.queue.as_ref(),
            options.host.as_deref(),
            self.scheme,
            &self.default_host,
        );
        let url = self.signed_url(&endpoint.to_url()?, &options, Utc::now())?;
        let context = Arc::new(CallContext::capture(action, endpoint.to_string(), location));

        debug!(action, endpoint = %endpoint, "Dispatching request");

        let transport = Arc::clone(&self.transport);
        let task_context = Arc::clone(&context);
        let handle = runtime.spawn(async move {
            let context = task_context;
            let outcome = classify(transport.get(url).await)
                .and_then(|response| transform(response).map_err(DispatchError::from));

            match outcome {
                Ok(value) => {
                    debug!(action = context.action, "Request succeeded");
                    Ok(value)
                }
                Err(failure) => {
                    log_failure(&context, &failure);
                    Err(failure)
                }
            }
        });

        Ok(Dispatch {
            handle,
            runtime,
            context,
        })
    }

    /// Build the complete signed URL for `endpoint` as of `now`.
    pub fn signed_url(
        &self,
        endpoint: &Url,
        options: &RequestOptions,
        now: DateTime<Utc>,
    ) -> Result<Url, ConfigurationError> {
        let expires = now
            .checked_add_signed(self.expires_after)
            .ok_or_else(|| ConfigurationError::Invalid {
                message: format!("Request expiry is out of range: {now} + {}", self.expires_after),
            })?;
        let defaults = self
            .protocol
            .to_params(self.signer.access_key_id(), expires);
        let params = merge_parameters(&defaults, options.params());
        let query = self.signer.sign_query(&Method::GET, endpoint, &params)?;

        let mut url = endpoint.clone();
        url.set_query(Some(&query));
        Ok(url)
    }
}

impl<T: Transport> fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("signer", &self.signer)
            .field("protocol", &self.protocol)
            .field("scheme", &self.scheme)
            .field("default_host", &self.default_host)
            .finish()
    }
}
