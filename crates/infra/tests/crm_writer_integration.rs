//! Appointment writer against a mock CRM server.
//!
//! Exercises the full HTTP path: CrmClient verbs, the writer's repair
//! protocol, and the attempt trail the booking flow stores.

use std::sync::Arc;
use std::time::Duration;

use bookline_core::appointment::payload::CanonicalAppointment;
use bookline_core::appointment::verify::VerifyExpectation;
use bookline_core::{
    AppointmentApi, AppointmentRequest, AppointmentWriter, MemoryProgressSink, MockClock,
    RunContext,
};
use bookline_domain::{CrmConfig, TimeFormat};
use bookline_infra::{CrmClient, HttpClient};
use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn crm_client(server: &MockServer) -> CrmClient {
    let http = HttpClient::builder()
        .timeout(Duration::from_secs(5))
        .max_attempts(1)
        .build()
        .expect("http client");
    CrmClient::new(
        http,
        &CrmConfig {
            base_url: server.uri(),
            access_token: "crm-token".into(),
            event_type_id: 5,
            location_id: None,
        },
    )
}

fn writer_request() -> AppointmentRequest {
    AppointmentRequest {
        appointment: CanonicalAppointment {
            name: "Intro call".into(),
            description: "Booking with Dana Cole <dana@example.com>".into(),
            starts_at: Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0).unwrap(),
            ends_at: Utc.with_ymd_and_hms(2025, 6, 2, 14, 30, 0).unwrap(),
            timezone: "America/New_York".into(),
            user_id: Some(12),
            contact_id: Some(34),
            event_type_id: 5,
            location_id: None,
        },
        expect: VerifyExpectation { require_location: false, require_contact: true },
    }
}

fn complete_record(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": 12,
        "start_date": "2025-06-02",
        "start_time": "09:00:00",
        "end_date": "2025-06-02",
        "end_time": "09:30:00",
        "event_type_id": 5,
        "contact_id": 34,
    })
}

fn incomplete_record(id: i64) -> serde_json::Value {
    let mut record = complete_record(id);
    record.as_object_mut().unwrap().remove("start_time");
    record
}

fn writer(api: Arc<dyn AppointmentApi>) -> AppointmentWriter {
    let progress = Arc::new(MemoryProgressSink::new());
    let clock = Arc::new(MockClock::new(Utc.with_ymd_and_hms(2025, 6, 2, 13, 0, 0).unwrap()));
    AppointmentWriter::new(api, progress, clock)
}

fn run() -> RunContext {
    RunContext { meeting_id: "m-1".into(), run_id: "r-1".into() }
}

#[tokio::test]
async fn clean_create_persists_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/events"))
        .and(header("authorization", "Bearer crm-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 501 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/events/501"))
        .respond_with(ResponseTemplate::new(200).set_body_json(complete_record(501)))
        .expect(1)
        .mount(&server)
        .await;

    let api = Arc::new(crm_client(&server));
    let outcome = writer(api).write(&run(), &writer_request()).await;

    assert!(outcome.persisted);
    assert_eq!(outcome.created_id, Some(501));
    assert_eq!(outcome.attempts.len(), 1);
    assert_eq!(outcome.used_time_format, TimeFormat::HourMinuteSecond);
}

#[tokio::test]
async fn server_rejection_is_a_failed_outcome() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/events"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "error": "bad payload" })))
        .expect(1)
        .mount(&server)
        .await;

    let api = Arc::new(crm_client(&server));
    let outcome = writer(api).write(&run(), &writer_request()).await;

    assert!(!outcome.persisted);
    assert_eq!(outcome.created_id, None);
    assert_eq!(outcome.attempts.len(), 1);
    assert_eq!(outcome.attempts[0].http_status, Some(422));
}

#[tokio::test]
async fn incomplete_readback_triggers_patch_repair() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/events"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7 })))
        .expect(1)
        .mount(&server)
        .await;
    // First read-back drops start_time; after the PATCH the record is whole.
    Mock::given(method("GET"))
        .and(path("/v1/events/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(incomplete_record(7)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/v1/events/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/events/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(complete_record(7)))
        .expect(1)
        .mount(&server)
        .await;

    let api = Arc::new(crm_client(&server));
    let outcome = writer(api).write(&run(), &writer_request()).await;

    assert!(outcome.persisted);
    assert_eq!(outcome.created_id, Some(7));
    let steps: Vec<&str> = outcome.attempts.iter().map(|a| a.step.as_str()).collect();
    assert_eq!(steps, vec!["crm:create", "crm:repair:patch"]);
}

#[tokio::test]
async fn non_json_body_is_wrapped_as_excerpt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/events/9"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let api = crm_client(&server);
    let response = api.get_event(9).await.expect("transport succeeds");

    assert_eq!(response.status, 502);
    assert!(response.body["raw"].as_str().unwrap().contains("bad gateway"));
}

#[tokio::test]
async fn contact_search_sends_email_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/contacts"))
        .and(query_param("email", "dana@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "contacts": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let api = crm_client(&server);
    let response = api.search_contacts("dana@example.com").await.expect("request succeeds");
    assert_eq!(response.status, 200);
}
