//! Pipeline and suite configuration types.
//!
//! Configuration is constructed once at process start and shared read-only
//! afterwards; there are no ambient singletons. Pass it explicitly to
//! whatever builds a [`crate::Pipeline`].

use std::time::Duration;

use bookwire_core::{Error, Result};
use url::Url;

/// Fixed defaults from which request chains are built.
///
/// Shared read-only across all requests built from it; concurrent use needs no
/// locking.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base URL every request path is resolved against.
    pub base_url: Url,
    /// Headers attached to every request built from the pipeline.
    pub default_headers: Vec<(String, String)>,
    /// Socket-level connect timeout.
    pub connect_timeout: Duration,
    /// Whole-call read timeout.
    pub read_timeout: Duration,
    /// Maximum retry attempts for transient statuses (on top of the initial call).
    pub max_retries: i32,
    /// First backoff delay; doubles after every retry.
    pub initial_retry_delay: Duration,
    /// Header name carrying the correlation id.
    pub correlation_header: String,
}

impl PipelineConfig {
    /// Create a configuration with the standard defaults for a base URL.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            default_headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Accept-Charset".to_string(), "utf-8".to_string()),
                ("User-Agent".to_string(), "bookwire/0.1".to_string()),
            ],
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
            max_retries: 2,
            initial_retry_delay: Duration::from_millis(250),
            correlation_header: "X-Correlation-Id".to_string(),
        }
    }

    /// Override both timeouts at once.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.read_timeout = timeout;
        self
    }

    /// Override the retry settings.
    #[must_use]
    pub const fn with_retries(mut self, max_retries: i32, initial_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.initial_retry_delay = initial_delay;
        self
    }
}

/// Username/password for token issuance against `POST /auth`.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

/// Process-wide suite configuration, loaded once from the environment.
///
/// | Variable              | Default                                 |
/// |-----------------------|-----------------------------------------|
/// | `BOOKER_BASE_URL`     | `https://restful-booker.herokuapp.com`  |
/// | `BOOKER_USERNAME`     | `admin`                                 |
/// | `BOOKER_PASSWORD`     | `password123`                           |
/// | `BOOKER_TIMEOUT_MS`   | `10000`                                 |
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Base URL of the API under test.
    pub base_url: Url,
    /// Credentials for token issuance.
    pub credentials: Credentials,
    /// Connect/read timeout, also used as the response-time SLA.
    pub timeout: Duration,
}

impl SuiteConfig {
    /// Load the suite configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `BOOKER_BASE_URL` is not a valid URL or
    /// `BOOKER_TIMEOUT_MS` is not an integer.
    pub fn from_env() -> Result<Self> {
        let base_url = env_or("BOOKER_BASE_URL", "https://restful-booker.herokuapp.com");
        let base_url = Url::parse(&base_url)?;

        let timeout_ms: u64 = env_or("BOOKER_TIMEOUT_MS", "10000")
            .parse()
            .map_err(|e| Error::invalid_request(format!("BOOKER_TIMEOUT_MS: {e}")))?;

        Ok(Self {
            base_url,
            credentials: Credentials {
                username: env_or("BOOKER_USERNAME", "admin"),
                password: env_or("BOOKER_PASSWORD", "password123"),
            },
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    /// Derive the pipeline configuration for this suite.
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new(self.base_url.clone()).with_timeout(self.timeout)
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
