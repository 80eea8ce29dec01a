//! End-to-end tests for the typed booking client against a mock server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bookwire::booking::{Booking, BookingApi, BookingDates};
use bookwire::middleware::{FailureReport, FailureSink};
use bookwire::{
    Credentials, Method, Pipeline, PipelineConfig, ResponseExpectations,
};

#[derive(Default)]
struct CollectingSink {
    reports: Mutex<Vec<FailureReport>>,
}

impl FailureSink for CollectingSink {
    fn record(&self, report: &FailureReport) {
        self.reports.lock().expect("lock").push(report.clone());
    }
}

fn credentials() -> Credentials {
    Credentials {
        username: "admin".to_string(),
        password: "password123".to_string(),
    }
}

fn api_for(server: &MockServer) -> BookingApi {
    let config = PipelineConfig::new(server.uri().parse().expect("url"))
        .with_retries(0, Duration::from_millis(1));
    BookingApi::new(Arc::new(Pipeline::builder(config).build()), credentials())
}

fn sample_booking() -> Booking {
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

fn created_body(id: i64, booking: &Booking) -> serde_json::Value {
    serde_json::json!({
        "bookingid": id,
        "booking": serde_json::to_value(booking).expect("booking json"),
    })
}

#[tokio::test]
async fn auth_exchanges_credentials_for_a_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth"))
        .and(body_json(serde_json::json!({
            "username": "admin",
            "password": "password123",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "abc123",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = api_for(&mock_server);
    let token = api.create_token().await.expect("token");
    assert_eq!(token, "abc123");
}

/// Creating a booking echoes the payload back with a server-assigned id.
#[tokio::test]
async fn create_echoes_booking_with_positive_id() {
    let mock_server = MockServer::start().await;
    let booking = sample_booking();

    Mock::given(method("POST"))
        .and(path("/booking"))
        .and(body_json(serde_json::to_value(&booking).expect("json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_body(42, &booking)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = api_for(&mock_server);
    let created = api.create(&booking).await.expect("created");

    assert!(created.bookingid > 0);
    assert_eq!(created.booking.firstname, "Sally");
    assert_eq!(created.booking, booking);
}

/// Updating without the auth token cookie is rejected by the server; the
/// client surfaces the status rather than retrying.
#[tokio::test]
async fn update_without_token_is_forbidden() {
    let mock_server = MockServer::start().await;
    let booking = sample_booking();

    Mock::given(method("PUT"))
        .and(path("/booking/42"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = api_for(&mock_server);
    let response = api
        .update_raw(42, &booking, None)
        .await
        .expect("response");
    assert_eq!(response.status(), 403);
}

/// The typed update path converts the rejection into an HTTP error.
#[tokio::test]
async fn update_with_stale_token_reports_http_error() {
    let mock_server = MockServer::start().await;
    let booking = sample_booking();

    Mock::given(method("PUT"))
        .and(path("/booking/42"))
        .and(header("Cookie", "token=stale"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = api_for(&mock_server);
    let err = api
        .update(42, &booking, "stale")
        .await
        .expect_err("should fail");
    assert_eq!(err.status(), Some(403));
}

/// Malformed JSON is a caller bug: the server's 4xx/5xx comes straight back
/// with no retry.
#[tokio::test]
async fn malformed_create_body_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/booking"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Bad Request"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = PipelineConfig::new(mock_server.uri().parse().expect("url"))
        .with_retries(3, Duration::from_millis(1));
    let sink = Arc::new(CollectingSink::default());
    let pipeline = Pipeline::builder(config)
        .failure_sink(Arc::clone(&sink) as Arc<dyn FailureSink>)
        .build();
    let api = BookingApi::new(Arc::new(pipeline), credentials());

    let response = api
        .create_raw(r#"{"firstname": "Sally", "lastname":"#)
        .await
        .expect("response");

    assert_eq!(response.status(), 400);
    // The failure is still captured once by the diagnostic unit.
    assert_eq!(sink.reports.lock().expect("lock").len(), 1);
}

/// Create, read, update, delete, in order, sharing one pipeline.
#[tokio::test]
async fn full_booking_lifecycle() {
    let mock_server = MockServer::start().await;
    let booking = sample_booking();
    let mut updated = booking.clone();
    updated.totalprice = 222;

    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "abc123",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/booking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_body(7, &booking)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/booking/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::to_value(&booking).expect("json")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/booking/7"))
        .and(header("Cookie", "token=abc123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::to_value(&updated).expect("json")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/booking/7"))
        .and(header("Cookie", "token=abc123"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = api_for(&mock_server);

    let token = api.create_token().await.expect("token");
    let created = api.create(&booking).await.expect("created");
    assert_eq!(created.bookingid, 7);

    let fetched = api.get(created.bookingid).await.expect("fetched");
    assert_eq!(fetched, booking);

    let replaced = api
        .update(created.bookingid, &updated, &token)
        .await
        .expect("updated");
    assert_eq!(replaced.totalprice, 222);

    api.delete(created.bookingid, &token).await.expect("deleted");
}

/// Response expectations verify contract details the typed client skips.
#[tokio::test]
async fn get_booking_meets_json_contract() {
    let mock_server = MockServer::start().await;
    let booking = sample_booking();

    Mock::given(method("GET"))
        .and(path("/booking/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::to_value(&booking).expect("json")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = PipelineConfig::new(mock_server.uri().parse().expect("url"));
    let pipeline = Pipeline::builder(config).build();

    let request = pipeline
        .request(Method::Get, "/booking/7")
        .expect("request")
        .build();
    let (response, elapsed) = pipeline.execute_timed(request).await.expect("response");

    ResponseExpectations::ok_json(Duration::from_secs(10))
        .status(200)
        .check(&response, elapsed)
        .expect("contract holds");

    let fetched: Booking = response.json().expect("booking");
    assert_eq!(fetched, booking);
}
