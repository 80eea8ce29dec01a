//! Failure logging with redaction.
//!
//! Records a diagnostic view of request and response when a request fails
//! (status >= 400), masking sensitive values first. The real request is never
//! mutated; only the recorded view is redacted. Response bodies are recorded
//! unredacted, a deliberate choice: they belong to the API under test.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use bookwire_core::{Method, Request, Response, Result};

use super::{Middleware, Next};

/// Fixed placeholder replacing any sensitive value.
pub const REDACTED: &str = "****";

/// Header names whose values are never logged.
const SENSITIVE_HEADERS: [&str; 5] = [
    "authorization",
    "proxy-authorization",
    "x-api-key",
    "api-key",
    "apikey",
];

/// Cookie names whose values are never logged.
const SENSITIVE_COOKIES: [&str; 4] = ["token", "id-token", "access-token", "refresh-token"];

#[allow(clippy::expect_used)]
static PASSWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)"password"\s*:\s*".*?""#).expect("valid pattern"));
#[allow(clippy::expect_used)]
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)"token"\s*:\s*".*?""#).expect("valid pattern"));

/// Redacted view of a failed request/response exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    /// Request method.
    pub method: Method,
    /// Full request URL.
    pub url: String,
    /// Request headers, sensitive values masked.
    pub headers: Vec<(String, String)>,
    /// Request cookies, sensitive values masked.
    pub cookies: Vec<(String, String)>,
    /// Query parameters, unredacted.
    pub query: Vec<(String, String)>,
    /// Request body with `password`/`token` JSON values masked, if present.
    pub body: Option<String>,
    /// Response status code.
    pub status: u16,
    /// Response headers, unredacted.
    pub response_headers: Vec<(String, String)>,
    /// Full response body, unredacted.
    pub response_body: String,
}

impl std::fmt::Display for FailureReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== request (redacted on failure) ===")?;
        writeln!(f, "{} {}", self.method, self.url)?;
        for (name, value) in &self.headers {
            writeln!(f, "header {name}: {value}")?;
        }
        for (name, value) in &self.cookies {
            writeln!(f, "cookie {name}={value}")?;
        }
        for (name, value) in &self.query {
            writeln!(f, "query {name}={value}")?;
        }
        if let Some(body) = &self.body {
            writeln!(f, "body {body}")?;
        }
        writeln!(f, "=== response ===")?;
        writeln!(f, "status {}", self.status)?;
        for (name, value) in &self.response_headers {
            writeln!(f, "header {name}: {value}")?;
        }
        write!(f, "body {}", self.response_body)
    }
}

/// Destination for [`FailureReport`]s.
pub trait FailureSink: Send + Sync {
    /// Record one diagnostic report.
    fn record(&self, report: &FailureReport);
}

/// Default sink: emits the report as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl FailureSink for TracingSink {
    fn record(&self, report: &FailureReport) {
        warn!(
            status = report.status,
            method = %report.method,
            url = %report.url,
            "request failed\n{report}"
        );
    }
}

/// Records a redacted diagnostic for every response with status >= 400.
///
/// Always delegates first and never touches the outgoing request. A failing or
/// panicking sink is swallowed; logging must not change the outcome of the
/// request it observes.
pub struct RedactingLogOnFailure {
    sink: Arc<dyn FailureSink>,
}

impl RedactingLogOnFailure {
    /// Log failures through `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    /// Log failures into a custom sink.
    #[must_use]
    pub fn with_sink(sink: Arc<dyn FailureSink>) -> Self {
        Self { sink }
    }

    /// Build the redacted report for a failed exchange.
    #[must_use]
    pub fn report_for(request: &Request, response: &Response) -> FailureReport {
        FailureReport {
            method: request.method(),
            url: request.url().to_string(),
            headers: request
                .headers()
                .iter()
                .map(|(name, value)| {
                    let value = if is_sensitive_header(name) {
                        REDACTED
                    } else {
                        value
                    };
                    (name.to_string(), value.to_string())
                })
                .collect(),
            cookies: request
                .cookies()
                .iter()
                .map(|(name, value)| {
                    let value = if is_sensitive_cookie(name) {
                        REDACTED
                    } else {
                        value
                    };
                    (name.to_string(), value.to_string())
                })
                .collect(),
            query: request.query_params(),
            body: request
                .body()
                .map(|body| redact_body(&String::from_utf8_lossy(body))),
            status: response.status(),
            response_headers: response_headers_verbatim(response),
            response_body: response.text(),
        }
    }
}

impl Default for RedactingLogOnFailure {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RedactingLogOnFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedactingLogOnFailure").finish_non_exhaustive()
    }
}

#[async_trait]
impl Middleware for RedactingLogOnFailure {
    async fn handle(&self, request: Request, next: Next<'_>) -> Result<Response> {
        let snapshot = request.clone();
        let response = next.run(request).await?;

        if response.status() >= 400 {
            let report = Self::report_for(&snapshot, &response);
            // A panicking sink must not fail the request it observes.
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                self.sink.record(&report);
            }));
            if outcome.is_err() {
                debug!("failure sink panicked, diagnostic dropped");
            }
        }

        Ok(response)
    }
}

fn is_sensitive_header(name: &str) -> bool {
    SENSITIVE_HEADERS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(name))
}

fn is_sensitive_cookie(name: &str) -> bool {
    SENSITIVE_COOKIES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(name))
}

fn response_headers_verbatim(response: &Response) -> Vec<(String, String)> {
    response
        .headers()
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// Mask the values of JSON keys `password` and `token` in a body.
///
/// Pattern substitution over double-quoted string values, matching keys
/// case-insensitively. Other fields pass through untouched.
fn redact_body(body: &str) -> String {
    let body = PASSWORD_RE.replace_all(body, format!(r#""password":"{REDACTED}""#));
    TOKEN_RE
        .replace_all(&body, format!(r#""token":"{REDACTED}""#))
        .into_owned()
}
