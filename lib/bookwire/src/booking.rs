//! Typed client for the public booking API.
//!
//! Thin adapter over the [`Pipeline`]: each method maps to one endpoint and
//! leaves all cross-cutting behavior (correlation, retries, failure logging)
//! to the chain. The upstream contract has two quirks worth knowing: create
//! returns 200 (not 201) and delete returns 201 (not 204).

use std::sync::Arc;

use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use bookwire_core::{Error, Method, Response, Result};

use crate::config::Credentials;
use crate::pipeline::Pipeline;

/// Check-in/check-out date pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDates {
    /// Arrival date.
    pub checkin: NaiveDate,
    /// Departure date.
    pub checkout: NaiveDate,
}

/// A booking payload, as sent to and echoed by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Guest first name.
    pub firstname: String,
    /// Guest last name.
    pub lastname: String,
    /// Total price in whole currency units.
    pub totalprice: i64,
    /// Whether a deposit was paid.
    pub depositpaid: bool,
    /// Stay dates.
    pub bookingdates: BookingDates,
    /// Free-form extras (e.g. "Breakfast").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additionalneeds: Option<String>,
}

/// Response of `POST /booking`: the new id plus the echoed booking.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedBooking {
    /// Server-assigned booking id.
    pub bookingid: i64,
    /// The booking as stored.
    pub booking: Booking,
}

#[derive(Serialize)]
struct AuthRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    token: String,
}

/// Client for the booking endpoints.
#[derive(Debug, Clone)]
pub struct BookingApi {
    pipeline: Arc<Pipeline>,
    credentials: Credentials,
}

impl BookingApi {
    /// Create a client over a shared pipeline.
    #[must_use]
    pub fn new(pipeline: Arc<Pipeline>, credentials: Credentials) -> Self {
        Self {
            pipeline,
            credentials,
        }
    }

    /// `POST /auth`: exchange the configured credentials for a token.
    pub async fn create_token(&self) -> Result<String> {
        let request = self
            .pipeline
            .request(Method::Post, "/auth")?
            .json(&AuthRequest {
                username: &self.credentials.username,
                password: &self.credentials.password,
            })?
            .build();

        let response = self.pipeline.execute(request).await?;
        let response = expect_status(response, 200, "auth token")?;
        let auth: AuthResponse = response.json()?;
        Ok(auth.token)
    }

    /// `POST /booking`: create a booking, expecting the upstream's 200.
    pub async fn create(&self, booking: &Booking) -> Result<CreatedBooking> {
        let request = self
            .pipeline
            .request(Method::Post, "/booking")?
            .json(booking)?
            .build();

        let response = self.pipeline.execute(request).await?;
        expect_status(response, 200, "create booking")?.json()
    }

    /// `POST /booking` with an arbitrary body, returning the raw response.
    ///
    /// No status assertion; used by negative-path tests (malformed JSON and
    /// the like).
    pub async fn create_raw(&self, body: impl Into<Bytes>) -> Result<Response> {
        let request = self
            .pipeline
            .request(Method::Post, "/booking")?
            .header("Content-Type", "application/json")
            .body(body)
            .build();

        self.pipeline.execute(request).await
    }

    /// `GET /booking/{id}`: fetch one booking.
    pub async fn get(&self, id: i64) -> Result<Booking> {
        let request = self
            .pipeline
            .request(Method::Get, &format!("/booking/{id}"))?
            .build();

        let response = self.pipeline.execute(request).await?;
        expect_status(response, 200, "get booking")?.json()
    }

    /// `PUT /booking/{id}`: replace a booking. Requires the auth token
    /// cookie.
    pub async fn update(&self, id: i64, booking: &Booking, token: &str) -> Result<Booking> {
        let response = self.update_raw(id, booking, Some(token)).await?;
        expect_status(response, 200, "update booking")?.json()
    }

    /// `PUT /booking/{id}` without status assertion; `token` is optional so
    /// unauthenticated negative paths can be exercised.
    pub async fn update_raw(
        &self,
        id: i64,
        booking: &Booking,
        token: Option<&str>,
    ) -> Result<Response> {
        let mut builder = self
            .pipeline
            .request(Method::Put, &format!("/booking/{id}"))?
            .json(booking)?;
        if let Some(token) = token {
            builder = builder.cookie("token", token);
        }

        self.pipeline.execute(builder.build()).await
    }

    /// `DELETE /booking/{id}`: remove a booking. The upstream signals success
    /// with 201 and no body.
    pub async fn delete(&self, id: i64, token: &str) -> Result<()> {
        let request = self
            .pipeline
            .request(Method::Delete, &format!("/booking/{id}"))?
            .cookie("token", token)
            .build();

        let response = self.pipeline.execute(request).await?;
        expect_status(response, 201, "delete booking")?;
        Ok(())
    }
}

/// Turn an unexpected status into [`Error::Http`], keeping the body for
/// diagnostics.
fn expect_status(response: Response, expected: u16, operation: &str) -> Result<Response> {
    if response.status() == expected {
        Ok(response)
    } else {
        Err(Error::http_with_body(
            response.status(),
            format!("{operation}: expected status {expected}"),
            response.into_body(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking() -> Booking {
        Booking {
            firstname: "Sally".to_string(),
            lastname: "Brown".to_string(),
            totalprice: 111,
            depositpaid: true,
            bookingdates: BookingDates {
                checkin: NaiveDate::from_ymd_opt(2025, 12, 20).expect("date"),
                checkout: NaiveDate::from_ymd_opt(2025, 12, 22).expect("date"),
            },
            additionalneeds: Some("Breakfast".to_string()),
        }
    }

    #[test]
    fn booking_serializes_dates_as_iso() {
        let json = serde_json::to_value(booking()).expect("serialize");
        assert_eq!(json["bookingdates"]["checkin"], "2025-12-20");
        assert_eq!(json["bookingdates"]["checkout"], "2025-12-22");
        assert_eq!(json["additionalneeds"], "Breakfast");
    }

    #[test]
    fn booking_omits_absent_additional_needs() {
        let mut value = booking();
        value.additionalneeds = None;
        let json = serde_json::to_value(value).expect("serialize");
        assert!(json.get("additionalneeds").is_none());
    }

    #[test]
    fn created_booking_deserializes() {
        let payload = serde_json::json!({
            "bookingid": 42,
            "booking": {
                "firstname": "Sally",
                "lastname": "Brown",
                "totalprice": 111,
                "depositpaid": true,
                "bookingdates": {"checkin": "2025-12-20", "checkout": "2025-12-22"},
                "additionalneeds": "Breakfast"
            }
        });

        let created: CreatedBooking =
            serde_json::from_value(payload).expect("deserialize");
        assert_eq!(created.bookingid, 42);
        assert_eq!(created.booking, booking());
    }

    #[test]
    fn expect_status_converts_mismatch_to_http_error() {
        use bookwire_core::FieldMap;

        let response = Response::new(403, FieldMap::new(), Bytes::from_static(b"Forbidden"));
        let err = expect_status(response, 200, "update booking").expect_err("should fail");

        assert_eq!(err.status(), Some(403));
        assert_eq!(err.body().map(AsRef::as_ref), Some(&b"Forbidden"[..]));
    }
}
