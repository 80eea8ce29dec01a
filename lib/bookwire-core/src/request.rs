//! HTTP request building.
//!
//! Use [`Request::builder`] to construct requests with headers, cookies, query
//! parameters, and bodies. Query parameters are carried on the URL itself.
//!
//! # Example
//!
//! ```
//! use bookwire_core::{Request, Method};
//!
//! let request = Request::builder(Method::Get, "https://api.example.com/booking".parse().unwrap())
//!     .header("Accept", "application/json")
//!     .query("firstname", "Sally")
//!     .build();
//! ```

use bytes::Bytes;

use crate::{ContentType, FieldMap, Method};

/// An HTTP request with method, URL, headers, cookies, and optional body.
///
/// Mutable while the middleware chain prepares it; the transport consumes it,
/// so nothing can change it after dispatch.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: url::Url,
    headers: FieldMap,
    cookies: FieldMap,
    body: Option<Bytes>,
}

impl Request {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: url::Url) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &FieldMap {
        &self.headers
    }

    /// Mutable access to headers.
    #[must_use]
    pub const fn headers_mut(&mut self) -> &mut FieldMap {
        &mut self.headers
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Request cookies.
    #[must_use]
    pub const fn cookies(&self) -> &FieldMap {
        &self.cookies
    }

    /// Mutable access to cookies.
    #[must_use]
    pub const fn cookies_mut(&mut self) -> &mut FieldMap {
        &mut self.cookies
    }

    /// Query parameters, decoded from the URL.
    #[must_use]
    pub fn query_params(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect()
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Consume into (method, url, headers, cookies, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, url::Url, FieldMap, FieldMap, Option<Bytes>) {
        (self.method, self.url, self.headers, self.cookies, self.body)
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: url::Url,
    headers: FieldMap,
    cookies: FieldMap,
    body: Option<Bytes>,
}

impl RequestBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: FieldMap::new(),
            cookies: FieldMap::new(),
            body: None,
        }
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets multiple headers.
    #[must_use]
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Sets a cookie.
    #[must_use]
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name, value);
        self
    }

    /// Appends a query parameter to the URL.
    #[must_use]
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a JSON body and the matching `Content-Type` header.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: serde::Serialize>(self, value: &T) -> crate::Result<Self> {
        let body = crate::to_json(value)?;
        Ok(self
            .header("Content-Type", ContentType::Json.as_str())
            .body(body))
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            cookies: self.cookies,
            body: self.body,
        }
    }
}
