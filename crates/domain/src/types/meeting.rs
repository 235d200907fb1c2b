//! Meeting and participant types
//!
//! The meeting row is the booking's source of truth: external systems are
//! best-effort mirrors of it, never the other way around.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the meeting is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationMode {
    Zoom,
    InPerson,
}

impl LocationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zoom => "zoom",
            Self::InPerson => "in_person",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "zoom" => Some(Self::Zoom),
            "in_person" => Some(Self::InPerson),
            _ => None,
        }
    }
}

/// Lifecycle status of a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Draft,
    Proposed,
    Booked,
    Cancelled,
    Rescheduled,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Proposed => "proposed",
            Self::Booked => "booked",
            Self::Cancelled => "cancelled",
            Self::Rescheduled => "rescheduled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "proposed" => Some(Self::Proposed),
            "booked" => Some(Self::Booked),
            "cancelled" => Some(Self::Cancelled),
            "rescheduled" => Some(Self::Rescheduled),
            _ => None,
        }
    }
}

/// A meeting being scheduled through a booking link.
///
/// External IDs (`external_*`, `calendar_event_id`) are set only after
/// verified persistence in the corresponding system — never speculatively.
/// A retried confirmation detects an existing ID and skips re-creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub duration_minutes: i64,
    pub location_mode: LocationMode,
    /// IANA zone the meeting's business hours are expressed in.
    pub timezone: String,
    pub host_user_id: Option<String>,
    pub participant_user_ids: Vec<String>,
    pub room_id: Option<String>,
    pub client_name: String,
    pub client_email: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub status: MeetingStatus,
    pub external_appointment_id: Option<i64>,
    pub external_contact_id: Option<i64>,
    pub external_matter_id: Option<i64>,
    pub calendar_event_id: Option<String>,
}

impl Meeting {
    /// Whether the external appointment sub-flow already completed for this
    /// meeting (the idempotency guard for retried confirmations).
    pub fn has_external_appointment(&self) -> bool {
        self.external_appointment_id.is_some()
    }
}

/// An internal staff member who can host or attend meetings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    /// The CRM's numeric id for this user, when linked.
    pub crm_user_id: Option<i64>,
    /// The CRM user's own timezone, when resolvable. Preferred over the
    /// meeting zone because the CRM renders times in its user's zone.
    pub crm_timezone: Option<String>,
}

/// A bookable room with an optional calendar resource address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    /// Calendar resource email; when present the room is invited as a
    /// resource attendee so the provider shows a room booking.
    pub resource_address: Option<String>,
}

/// Stored calendar provider connection for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConnection {
    pub user_id: String,
    pub calendar_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CalendarConnection {
    /// Whether the access token expires within `threshold_secs`.
    pub fn expires_within(&self, now: DateTime<Utc>, threshold_secs: i64) -> bool {
        (self.expires_at - now).num_seconds() <= threshold_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            MeetingStatus::Draft,
            MeetingStatus::Proposed,
            MeetingStatus::Booked,
            MeetingStatus::Cancelled,
            MeetingStatus::Rescheduled,
        ] {
            assert_eq!(MeetingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MeetingStatus::parse("unknown"), None);
    }

    #[test]
    fn connection_expiry_threshold() {
        let now = Utc::now();
        let conn = CalendarConnection {
            user_id: "u1".into(),
            calendar_id: "u1@example.com".into(),
            access_token: "tok".into(),
            refresh_token: "ref".into(),
            expires_at: now + chrono::Duration::seconds(120),
        };
        assert!(conn.expires_within(now, 300));
        assert!(!conn.expires_within(now, 60));
    }
}
