//! Request middleware for the bookwire pipeline.
//!
//! A [`Middleware`] receives the outgoing [`Request`] together with a [`Next`]
//! capability that invokes the rest of the chain, terminating at the
//! [`Transport`]. A unit may mutate the request before delegating, call `next`
//! zero or more times (enabling retries), inspect the response on the way
//! back, and return a possibly different response.
//!
//! Units are composed as an explicit ordered list; the unit at position `i`
//! wraps everything at positions `> i`. A connection-level transport failure
//! propagates as an [`Error`](bookwire_core::Error), not a response, and a
//! unit may catch and convert it or let it bubble.
//!
//! # Available units
//!
//! - [`CorrelationId`] - Attaches an `X-Correlation-Id` header if absent
//! - [`RedactingLogOnFailure`] - Records a redacted diagnostic on status >= 400
//! - [`RetryWithBackoff`] - Retries 502/503/504 with exponential backoff
//! - [`SecretMasking`] - Overwrites sensitive header/cookie values in the request
//!
//! # Example
//!
//! ```ignore
//! struct NoCache;
//!
//! #[async_trait]
//! impl Middleware for NoCache {
//!     async fn handle(&self, mut request: Request, next: Next<'_>) -> Result<Response> {
//!         request.headers_mut().insert("Cache-Control", "no-cache");
//!         next.run(request).await
//!     }
//! }
//! ```

mod correlation;
mod log_on_failure;
mod retry;
mod secret_masking;

use std::sync::Arc;

use async_trait::async_trait;
use futures_core::future::BoxFuture;

use bookwire_core::{Request, Response, Result, Transport};

pub use correlation::CorrelationId;
pub use log_on_failure::{FailureReport, FailureSink, REDACTED, RedactingLogOnFailure, TracingSink};
pub use retry::RetryWithBackoff;
pub use secret_masking::SecretMasking;

/// One unit in the request middleware chain.
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    /// Process a request, delegating inward through `next`.
    async fn handle(&self, request: Request, next: Next<'_>) -> Result<Response>;
}

/// Capability to invoke the remainder of the chain, including the transport.
///
/// `Next` is `Copy`: a unit may run it several times with cloned requests,
/// which is how retries re-send the same logical request.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    transport: &'a dyn Transport,
    middleware: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    /// Create the entry point of a chain.
    #[must_use]
    pub fn new(transport: &'a dyn Transport, middleware: &'a [Arc<dyn Middleware>]) -> Self {
        Self {
            transport,
            middleware,
        }
    }

    /// Run the remaining units and the terminal transport call.
    pub fn run(self, request: Request) -> BoxFuture<'a, Result<Response>> {
        if let Some((current, rest)) = self.middleware.split_first() {
            let next = Self {
                transport: self.transport,
                middleware: rest,
            };
            current.handle(request, next)
        } else {
            self.transport.send(request)
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.middleware.len())
            .finish_non_exhaustive()
    }
}
