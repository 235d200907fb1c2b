//! Wire types for the Google Calendar v3 API.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/* ---- OAuth token refresh ---- */

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime of the new token in seconds.
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/* ---- freeBusy ---- */

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyRequest {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    pub items: Vec<FreeBusyItem>,
}

#[derive(Debug, Serialize)]
pub struct FreeBusyItem {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct FreeBusyResponse {
    #[serde(default)]
    pub calendars: HashMap<String, CalendarBusy>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarBusy {
    #[serde(default)]
    pub busy: Vec<BusyPeriod>,
    #[serde(default)]
    pub errors: Vec<FreeBusyError>,
}

#[derive(Debug, Deserialize)]
pub struct BusyPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct FreeBusyError {
    #[serde(default)]
    pub reason: String,
}

/* ---- events ---- */

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResource {
    pub summary: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub attendees: Vec<WireAttendee>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: DateTime<Utc>,
    pub time_zone: String,
}

#[derive(Debug, Serialize)]
pub struct WireAttendee {
    pub email: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub resource: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEventResponse {
    pub id: String,
    #[serde(default)]
    pub html_link: Option<String>,
}
