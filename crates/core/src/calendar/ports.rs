//! Calendar provider port interfaces

use async_trait::async_trait;
use bookline_domain::{BusyInterval, CalendarConnection, Result};
use chrono::{DateTime, Utc};

/// One attendee on an outgoing calendar event. `resource` marks a room
/// resource address so the provider displays a room booking rather than a
/// personal attendee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventAttendee {
    pub email: String,
    pub resource: bool,
}

impl EventAttendee {
    pub fn person(email: impl Into<String>) -> Self {
        Self { email: email.into(), resource: false }
    }

    pub fn room(email: impl Into<String>) -> Self {
        Self { email: email.into(), resource: true }
    }
}

/// A calendar event to be created on the organizer's calendar.
#[derive(Debug, Clone)]
pub struct EventSpec {
    /// Organizer's calendar (the meeting host, never the booking requester).
    pub calendar_id: String,
    /// User the provider connection belongs to.
    pub host_user_id: String,
    pub summary: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// IANA zone sent alongside the instants.
    pub timezone: String,
    pub attendees: Vec<EventAttendee>,
    /// Whether the provider should email invitations.
    pub send_updates: bool,
}

/// Provider response for a created event.
#[derive(Debug, Clone)]
pub struct CreatedEvent {
    pub id: String,
    pub html_link: Option<String>,
}

/// Free/busy query against one or more calendars.
#[async_trait]
pub trait FreeBusyProvider: Send + Sync {
    /// Busy intervals for the given calendars within `[time_min, time_max)`,
    /// flattened across calendars (the merger consolidates them).
    async fn free_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        calendar_ids: &[String],
    ) -> Result<Vec<BusyInterval>>;
}

/// Event creation against the provider.
#[async_trait]
pub trait CalendarEvents: Send + Sync {
    async fn create_event(&self, spec: &EventSpec) -> Result<CreatedEvent>;
}

/// Stored OAuth connection rows, read fresh per invocation.
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<CalendarConnection>>;

    /// Persist a refreshed access token and its new expiry.
    async fn update_tokens(
        &self,
        user_id: &str,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;
}
