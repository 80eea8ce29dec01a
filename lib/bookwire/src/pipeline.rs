//! The request pipeline: configuration + middleware chain + transport.
//!
//! A [`Pipeline`] is built once from a [`PipelineConfig`] and shared read-only
//! across all requests (and all concurrent test cases). Each execution runs as
//! one logical call stack: units observe the request outer-to-inner and the
//! response inner-to-outer, retries included.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bookwire_core::{Method, Request, RequestBuilder, Response, Result, Transport};

use crate::config::PipelineConfig;
use crate::middleware::{
    CorrelationId, FailureSink, Middleware, Next, RedactingLogOnFailure, RetryWithBackoff,
};
use crate::transport::HyperTransport;

/// A named, reusable middleware chain over a single transport.
pub struct Pipeline {
    config: PipelineConfig,
    middleware: Vec<Arc<dyn Middleware>>,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    /// Start building a pipeline from a configuration.
    #[must_use]
    pub fn builder(config: PipelineConfig) -> PipelineBuilder {
        PipelineBuilder {
            config,
            extra: Vec::new(),
            transport: None,
            failure_sink: None,
        }
    }

    /// The configuration this pipeline was built from.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Begin a request against the configured base URL, with the default
    /// headers applied.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not resolve against the base URL.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.config.base_url.join(path)?;
        let mut builder = Request::builder(method, url);
        for (name, value) in &self.config.default_headers {
            builder = builder.header(name.clone(), value.clone());
        }
        Ok(builder)
    }

    /// Execute a request through the middleware chain.
    pub async fn execute(&self, request: Request) -> Result<Response> {
        Next::new(self.transport.as_ref(), &self.middleware)
            .run(request)
            .await
    }

    /// Execute a request and measure the wall-clock time it took, for
    /// response-time expectations.
    pub async fn execute_timed(&self, request: Request) -> Result<(Response, Duration)> {
        let start = Instant::now();
        let response = self.execute(request).await?;
        Ok((response, start.elapsed()))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("middleware_count", &self.middleware.len())
            .finish_non_exhaustive()
    }
}

/// Builder assembling the standard chain from a [`PipelineConfig`].
///
/// The unit order is fixed: Correlation-Id wraps Redacted-Failure-Logging
/// wraps Retry-With-Backoff wraps the transport. Logging must wrap retries so
/// the final outcome of a retried request is recorded exactly once, and the
/// correlation id runs outermost so every attempt of one logical request
/// shares the same id. Extra units are appended innermost, just outside the
/// transport.
pub struct PipelineBuilder {
    config: PipelineConfig,
    extra: Vec<Arc<dyn Middleware>>,
    transport: Option<Arc<dyn Transport>>,
    failure_sink: Option<Arc<dyn FailureSink>>,
}

impl PipelineBuilder {
    /// Append a custom middleware unit (runs innermost).
    #[must_use]
    pub fn middleware(mut self, unit: impl Middleware) -> Self {
        self.extra.push(Arc::new(unit));
        self
    }

    /// Replace the transport. Used by tests to script responses; defaults to
    /// [`HyperTransport`] with the configured timeouts.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Route failure diagnostics into a custom sink instead of `tracing`.
    #[must_use]
    pub fn failure_sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
        self.failure_sink = Some(sink);
        self
    }

    /// Build the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        let transport = self.transport.unwrap_or_else(|| {
            Arc::new(HyperTransport::new(
                self.config.connect_timeout,
                self.config.read_timeout,
            ))
        });

        let logging = match self.failure_sink {
            Some(sink) => RedactingLogOnFailure::with_sink(sink),
            None => RedactingLogOnFailure::new(),
        };

        let mut middleware: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(CorrelationId::with_header(
                self.config.correlation_header.clone(),
            )),
            Arc::new(logging),
            Arc::new(RetryWithBackoff::new(
                self.config.max_retries,
                self.config.initial_retry_delay,
            )),
        ];
        middleware.extend(self.extra);

        Pipeline {
            config: self.config,
            middleware,
            transport,
        }
    }
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("config", &self.config)
            .field("extra_count", &self.extra.len())
            .finish_non_exhaustive()
    }
}
