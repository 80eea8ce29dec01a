//! HTTP middleware pipeline and typed client for booking API test suites.
//!
//! bookwire layers cross-cutting request middleware (correlation ids,
//! redacted failure logging, retry with backoff) onto a single outbound HTTP
//! call, and builds a small typed client for the public booking API on top.
//!
//! # Example
//!
//! ```ignore
//! use bookwire::{Pipeline, PipelineConfig};
//! use bookwire::booking::{Booking, BookingApi};
//!
//! let config = PipelineConfig::new("https://restful-booker.herokuapp.com".parse()?);
//! let pipeline = Pipeline::builder(config).build();
//! let api = BookingApi::new(Arc::new(pipeline), credentials);
//!
//! let created = api.create(&booking).await?;
//! assert!(created.bookingid > 0);
//! ```
//!
//! # Middleware order
//!
//! The standard chain is fixed: Correlation-Id wraps Redacted-Failure-Logging
//! wraps Retry-With-Backoff wraps the transport. Logging wraps retries so the
//! final outcome of a retried request is visible exactly once; the correlation
//! id runs outermost so it is stable across retries of one logical request.

pub mod booking;
mod config;
mod connector;
mod expect;
pub mod middleware;
mod pipeline;
mod transport;

pub use config::{Credentials, PipelineConfig, SuiteConfig};
pub use connector::https_connector;
pub use expect::ResponseExpectations;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use transport::HyperTransport;

// Re-export core types so most users need a single crate.
pub use bookwire_core::{
    ContentType, Error, FieldMap, Method, Request, RequestBuilder, Response, Result, Transport,
    from_json, to_json,
};
