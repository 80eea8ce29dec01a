//! Secret-masking middleware.
//!
//! Overwrites sensitive header and cookie values in the request itself with
//! the redaction token, so that nothing downstream (including other logging
//! units) can see them. Unlike [`super::RedactingLogOnFailure`] this DOES
//! mutate the outgoing request; place it only in chains that never need the
//! real secrets on the wire, e.g. replay or recording setups.

use async_trait::async_trait;

use bookwire_core::{Request, Response, Result};

use super::{Middleware, Next, log_on_failure::REDACTED};

/// Replaces sensitive header/cookie values with `****` before delegating.
#[derive(Debug, Clone)]
pub struct SecretMasking {
    sensitive: Vec<String>,
}

impl SecretMasking {
    /// Mask the given header/cookie names (compared case-insensitively).
    #[must_use]
    pub fn new(sensitive: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            sensitive: sensitive.into_iter().map(Into::into).collect(),
        }
    }

    /// Sensible defaults covering common auth headers and token cookies.
    #[must_use]
    pub fn default_secrets() -> Self {
        Self::new([
            "authorization",
            "proxy-authorization",
            "x-api-key",
            "api-key",
            "apikey",
            "token",
            "id-token",
            "access-token",
            "refresh-token",
            "password",
        ])
    }

    fn is_sensitive(&self, name: &str) -> bool {
        self.sensitive
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(name))
    }
}

#[async_trait]
impl Middleware for SecretMasking {
    async fn handle(&self, mut request: Request, next: Next<'_>) -> Result<Response> {
        let masked_headers: Vec<String> = request
            .headers()
            .iter()
            .filter(|(name, _)| self.is_sensitive(name))
            .map(|(name, _)| name.to_string())
            .collect();
        for name in masked_headers {
            request.headers_mut().insert(name, REDACTED);
        }

        let masked_cookies: Vec<String> = request
            .cookies()
            .iter()
            .filter(|(name, _)| self.is_sensitive(name))
            .map(|(name, _)| name.to_string())
            .collect();
        for name in masked_cookies {
            request.cookies_mut().insert(name, REDACTED);
        }

        next.run(request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bookwire_core::Method;

    use super::super::testing::ScriptedTransport;
    use super::*;

    #[tokio::test]
    async fn masks_default_secrets_and_keeps_the_rest() {
        let request = Request::builder(
            Method::Get,
            "https://example.com/booking".parse().expect("url"),
        )
        .header("Authorization", "Bearer real-token")
        .header("Accept", "application/json")
        .cookie("token", "abc123")
        .cookie("theme", "dark")
        .build();

        let transport = ScriptedTransport::new([200]);
        let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(SecretMasking::default_secrets())];
        Next::new(&transport, &chain)
            .run(request)
            .await
            .expect("response");

        let seen = transport.seen.lock().expect("lock");
        let seen = seen.first().expect("one request");
        assert_eq!(seen.header("authorization"), Some(REDACTED));
        assert_eq!(seen.header("Accept"), Some("application/json"));
        assert_eq!(seen.cookies().get("token"), Some(REDACTED));
        assert_eq!(seen.cookies().get("theme"), Some("dark"));
    }
}
