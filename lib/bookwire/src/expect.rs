//! Declarative response expectations.
//!
//! Assertion-time predicate checks against a completed [`Response`]; nothing
//! here changes pipeline behavior. Mirrors the reusable "response spec"
//! pattern: build the expectation once, apply it to every call that shares
//! the same contract.

use std::time::Duration;

use bookwire_core::{ContentType, Error, Response, Result};

/// A set of checks to apply to a completed response.
///
/// # Example
///
/// ```ignore
/// let expect = ResponseExpectations::ok_json(Duration::from_secs(10));
/// let (response, elapsed) = pipeline.execute_timed(request).await?;
/// expect.check(&response, elapsed)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResponseExpectations {
    status: Option<u16>,
    content_type: Option<String>,
    max_response_time: Option<Duration>,
}

impl ResponseExpectations {
    /// No expectations; add them with the builder methods.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON content type and a response-time SLA.
    #[must_use]
    pub fn ok_json(max_response_time: Duration) -> Self {
        Self::new()
            .content_type(ContentType::Json)
            .max_response_time(max_response_time)
    }

    /// Status-only expectation for endpoints with no body (e.g. 204/201).
    #[must_use]
    pub fn status_only(status: u16) -> Self {
        Self::new().status(status)
    }

    /// Expect an exact status code.
    #[must_use]
    pub const fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Expect a content type (charset parameters are ignored).
    #[must_use]
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type.as_str().to_string());
        self
    }

    /// Expect the response to arrive within a duration.
    #[must_use]
    pub const fn max_response_time(mut self, max: Duration) -> Self {
        self.max_response_time = Some(max);
        self
    }

    /// Check every expectation, reporting all violations at once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Expectation`] listing each failed check.
    pub fn check(&self, response: &Response, elapsed: Duration) -> Result<()> {
        let mut violations = Vec::new();

        if let Some(expected) = self.status
            && response.status() != expected
        {
            violations.push(format!(
                "status: expected {expected}, got {}",
                response.status()
            ));
        }

        if let Some(expected) = &self.content_type {
            let actual = response.header("Content-Type").unwrap_or_default();
            if !actual
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .eq_ignore_ascii_case(expected)
            {
                violations.push(format!("content type: expected {expected}, got '{actual}'"));
            }
        }

        if let Some(max) = self.max_response_time
            && elapsed > max
        {
            violations.push(format!("response time: {elapsed:?} exceeded {max:?}"));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::expectation(violations.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use bookwire_core::FieldMap;
    use bytes::Bytes;

    use super::*;

    fn json_response(status: u16) -> Response {
        let headers: FieldMap = [("Content-Type", "application/json; charset=utf-8")]
            .into_iter()
            .collect();
        Response::new(status, headers, Bytes::from_static(b"{}"))
    }

    #[test]
    fn ok_json_passes_for_json_within_sla() {
        let expect = ResponseExpectations::ok_json(Duration::from_secs(1));
        expect
            .check(&json_response(200), Duration::from_millis(20))
            .expect("should pass");
    }

    #[test]
    fn content_type_mismatch_is_reported() {
        let expect = ResponseExpectations::new().content_type(ContentType::Json);
        let response = Response::new(
            200,
            [("Content-Type", "text/html")].into_iter().collect(),
            Bytes::new(),
        );

        let_assert!(Err(err) = expect.check(&response, Duration::ZERO));
        check!(err.to_string().contains("content type"));
    }

    #[test]
    fn sla_violation_is_reported() {
        let expect = ResponseExpectations::ok_json(Duration::from_millis(10));
        let_assert!(Err(err) = expect.check(&json_response(200), Duration::from_millis(50)));
        check!(err.to_string().contains("response time"));
    }

    #[test]
    fn status_only_expectation() {
        let expect = ResponseExpectations::status_only(201);
        expect
            .check(&json_response(201), Duration::ZERO)
            .expect("should pass");

        let_assert!(Err(err) = expect.check(&json_response(200), Duration::ZERO));
        check!(err.to_string().contains("expected 201"));
    }

    #[test]
    fn multiple_violations_are_joined() {
        let expect = ResponseExpectations::new()
            .status(204)
            .max_response_time(Duration::from_millis(1));
        let_assert!(Err(err) = expect.check(&json_response(500), Duration::from_secs(1)));

        let message = err.to_string();
        check!(message.contains("status"));
        check!(message.contains("response time"));
    }
}
