//! Correlation-id middleware.
//!
//! Attaches an opaque unique id to each outgoing request so it can be traced
//! end-to-end across systems. Runs outermost in the standard chain so the id
//! stays stable across retries of the same logical request.

use async_trait::async_trait;

use bookwire_core::{Request, Response, Result};

use super::{Middleware, Next};

/// Default header carrying the correlation id.
pub const DEFAULT_HEADER: &str = "X-Correlation-Id";

type IdGenerator = Box<dyn Fn() -> String + Send + Sync>;

/// Attaches a fresh correlation id header unless the caller already set one.
///
/// Idempotent: a caller-supplied id is never overwritten. No response-side
/// behavior.
pub struct CorrelationId {
    header: String,
    generator: IdGenerator,
}

impl CorrelationId {
    /// Correlation ids under [`DEFAULT_HEADER`], generated as random UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self::with_header(DEFAULT_HEADER)
    }

    /// Use a different header name (e.g. `x-request-id` to match platform
    /// conventions).
    #[must_use]
    pub fn with_header(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            generator: Box::new(|| uuid::Uuid::new_v4().to_string()),
        }
    }

    /// Replace the id generator. Mostly useful in tests.
    #[must_use]
    pub fn with_generator(
        mut self,
        generator: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.generator = Box::new(generator);
        self
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorrelationId")
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Middleware for CorrelationId {
    async fn handle(&self, mut request: Request, next: Next<'_>) -> Result<Response> {
        if !request.headers().contains(&self.header) {
            request.headers_mut().insert(&self.header, (self.generator)());
        }
        next.run(request).await
    }
}
