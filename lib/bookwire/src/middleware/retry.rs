//! Retry middleware with exponential backoff.
//!
//! Retries transient upstream errors (502/503/504) so a brief hiccup does not
//! fail a whole test run. Connection-level errors are not retried; they
//! propagate to the caller unchanged.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use bookwire_core::{Request, Response, Result};

use super::{Middleware, Next};

/// Status codes worth retrying: the upstream was reachable but momentarily
/// unable to serve.
const TRANSIENT: [u16; 3] = [502, 503, 504];

/// Retries transient responses with exponential backoff.
///
/// With `max_retries = N` the transport is invoked at most `N + 1` times, with
/// delays `initial_delay * 2^k` between attempts. The last response obtained
/// is returned once retries are exhausted or a non-transient status arrives.
///
/// The backoff sleep suspends only the calling task; concurrent pipelines keep
/// running.
#[derive(Debug, Clone)]
pub struct RetryWithBackoff {
    max_retries: u32,
    initial_delay: Duration,
}

impl RetryWithBackoff {
    /// Create a retry unit. Negative `max_retries` is clamped to zero.
    #[must_use]
    pub fn new(max_retries: i32, initial_delay: Duration) -> Self {
        Self {
            max_retries: u32::try_from(max_retries.max(0)).unwrap_or(0),
            initial_delay,
        }
    }

    fn is_transient(response: &Response) -> bool {
        TRANSIENT.contains(&response.status())
    }
}

#[async_trait]
impl Middleware for RetryWithBackoff {
    async fn handle(&self, request: Request, next: Next<'_>) -> Result<Response> {
        let mut response = next.run(request.clone()).await?;
        let mut attempt = 0;
        let mut delay = self.initial_delay;

        while attempt < self.max_retries && Self::is_transient(&response) {
            debug!(
                status = response.status(),
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "transient response, backing off before retry"
            );
            tokio::time::sleep(delay).await;
            delay *= 2;
            attempt += 1;
            response = next.run(request.clone()).await?;
        }

        Ok(response)
    }
}
