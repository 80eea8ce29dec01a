//! HTTP transport implementation using hyper-util.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};

use bookwire_core::{Error, FieldMap, Request, Response, Result, Transport};

use crate::connector::https_connector;

/// [`Transport`] backed by the hyper-util legacy client with connection
/// pooling and rustls TLS.
///
/// The read timeout wraps the whole call; exceeding it yields
/// [`Error::Timeout`]. The connect timeout is set on the connector.
#[derive(Clone)]
pub struct HyperTransport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    read_timeout: Duration,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a new transport with the given socket-level timeouts.
    #[must_use]
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        let inner = Client::builder(TokioExecutor::new()).build(https_connector(connect_timeout));
        Self {
            inner,
            read_timeout,
        }
    }

    /// Build a hyper request from a bookwire request.
    ///
    /// Cookies are rendered into a single `Cookie` header.
    fn build_hyper_request(request: Request) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, cookies, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());

        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }

        if !cookies.is_empty() {
            let rendered = cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header("Cookie", rendered);
        }

        let body = body.map_or_else(Full::default, Full::new);
        builder
            .body(body)
            .map_err(|e| Error::invalid_request(e.to_string()))
    }

    /// Extract response headers into a [`FieldMap`], preserving wire order.
    fn extract_headers(headers: &http::HeaderMap) -> FieldMap {
        headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v)))
            .collect()
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        if let Some(tls) = find_tls_error(&err) {
            return Error::tls(tls);
        }
        Error::connection(err.to_string())
    }
}

/// Look for a [`rustls::Error`] anywhere in the source chain.
///
/// TLS failures surface wrapped in connect errors, so the chain is walked
/// rather than inspecting the outermost error alone.
fn find_tls_error(err: &(dyn std::error::Error + 'static)) -> Option<String> {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(tls) = inner.downcast_ref::<rustls::Error>() {
            return Some(tls.to_string());
        }
        source = inner.source();
    }
    None
}

#[async_trait]
impl Transport for HyperTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        let hyper_request = Self::build_hyper_request(request)?;

        let response = tokio::time::timeout(self.read_timeout, self.inner.request(hyper_request))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(Self::map_hyper_error)?;

        let status = response.status().as_u16();
        let response_headers = Self::extract_headers(response.headers());

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::connection(e.to_string()))?
            .to_bytes();

        Ok(Response::new(status, response_headers, body))
    }
}
