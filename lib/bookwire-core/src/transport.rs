//! The transport boundary.
//!
//! A [`Transport`] performs exactly one network call. Everything above it
//! (correlation ids, failure logging, retries) is middleware; everything below
//! it is the HTTP client implementation.

use async_trait::async_trait;

use crate::{Request, Response, Result};

/// Performs one network call given a request.
///
/// A connection-level failure (network/DNS/timeout at socket level) is an
/// error outcome, distinct from any received [`Response`]. Implementations
/// must not retry or otherwise resend; that is a middleware concern.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the call could not complete:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    /// - Invalid request
    async fn send(&self, request: Request) -> Result<Response>;
}
