//! Core types for the bookwire HTTP test pipeline.
//!
//! This crate provides the foundational types used by bookwire:
//! - [`Method`] - HTTP method enum
//! - [`FieldMap`] - Ordered, case-insensitive name/value map for headers and cookies
//! - [`Request`] and [`RequestBuilder`] - HTTP request types
//! - [`Response`] - HTTP response type
//! - [`Error`] and [`Result`] - Error handling
//! - [`Transport`] - The terminal "one network call" boundary

mod body;
mod error;
mod fields;
mod method;
mod request;
mod response;
mod transport;

pub use body::{ContentType, from_json, to_json};
pub use error::{Error, Result};
pub use fields::FieldMap;
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use transport::Transport;

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
