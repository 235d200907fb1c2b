//! Shared fixtures for the infra integration tests.

#![allow(dead_code)]

use bookline_domain::{
    BookingRequest, BookingRequestStatus, CalendarConnection, LocationMode, Meeting,
    MeetingStatus, Room, User,
};
use bookline_infra::DbManager;
use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Captured per-test tracing output, filterable via `RUST_LOG`.
static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub struct TestDb {
    pub manager: DbManager,
    _dir: TempDir,
}

pub fn test_db() -> TestDb {
    Lazy::force(&TRACING);
    let dir = TempDir::new().expect("temp dir");
    let manager = DbManager::new(dir.path().join("test.db"), 4).expect("db manager");
    manager.run_migrations().expect("migrations");
    TestDb { manager, _dir: dir }
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 13, 0, 0).single().expect("valid instant")
}

pub fn host_user() -> User {
    User {
        id: "u-host".into(),
        email: "host@example.com".into(),
        display_name: "Harper Host".into(),
        crm_user_id: Some(12),
        crm_timezone: Some("America/Chicago".into()),
    }
}

pub fn conference_room() -> Room {
    Room {
        id: "room-1".into(),
        name: "Boardroom".into(),
        resource_address: Some("boardroom@resource.example.com".into()),
    }
}

pub fn draft_meeting() -> Meeting {
    Meeting {
        id: "m-1".into(),
        title: "Intro call".into(),
        duration_minutes: 30,
        location_mode: LocationMode::Zoom,
        timezone: "America/New_York".into(),
        host_user_id: Some("u-host".into()),
        participant_user_ids: vec![],
        room_id: None,
        client_name: "Dana Cole".into(),
        client_email: "dana@example.com".into(),
        starts_at: None,
        ends_at: None,
        status: MeetingStatus::Proposed,
        external_appointment_id: None,
        external_contact_id: None,
        external_matter_id: None,
        calendar_event_id: None,
    }
}

pub fn open_request(meeting_id: &str, expires_at: DateTime<Utc>) -> BookingRequest {
    BookingRequest {
        id: "br-1".into(),
        meeting_id: meeting_id.to_string(),
        public_token: "tok-abc123".into(),
        expires_at,
        status: BookingRequestStatus::Open,
    }
}

pub fn live_connection(user_id: &str, expires_at: DateTime<Utc>) -> CalendarConnection {
    CalendarConnection {
        user_id: user_id.to_string(),
        calendar_id: "host@example.com".into(),
        access_token: "stored-access".into(),
        refresh_token: "stored-refresh".into(),
        expires_at,
    }
}
