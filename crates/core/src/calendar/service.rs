//! Calendar event assembly
//!
//! Builds one event per booked meeting with the meeting host as organizer.
//! Failures never block the booking: the meeting row is the source of
//! truth, the calendar event is a best-effort mirror.

use std::sync::Arc;

use bookline_domain::{LocationMode, LogLevel, Meeting, ProgressLogEntry, Result};
use tracing::{debug, warn};

use super::ports::{CalendarEvents, CreatedEvent, EventAttendee, EventSpec};
use crate::booking::ports::Directory;
use crate::progress::ports::ProgressSink;
use crate::time::clock::Clock;

/// What happened to the calendar write for one meeting.
#[derive(Debug, Clone)]
pub enum CalendarWriteResult {
    Created(CreatedEvent),
    /// The meeting has no assigned host, so there is no organizer calendar
    /// to write to. The skip is surfaced as a warning rather than silently
    /// swallowed.
    SkippedNoHost,
}

/// Builds and writes the calendar event for a booked meeting.
pub struct CalendarEventService {
    events: Arc<dyn CalendarEvents>,
    directory: Arc<dyn Directory>,
    progress: Arc<dyn ProgressSink>,
    clock: Arc<dyn Clock>,
}

impl CalendarEventService {
    pub fn new(
        events: Arc<dyn CalendarEvents>,
        directory: Arc<dyn Directory>,
        progress: Arc<dyn ProgressSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { events, directory, progress, clock }
    }

    /// Create the provider event for a booked meeting.
    ///
    /// Attendees are all internal participants, the external client, and —
    /// for in-person meetings with a configured resource address — the room
    /// as a resource attendee. The organizer is always the meeting host.
    pub async fn create_for_meeting(
        &self,
        meeting: &Meeting,
        run_id: &str,
    ) -> Result<CalendarWriteResult> {
        let Some(host_user_id) = meeting.host_user_id.as_deref() else {
            debug!(meeting_id = %meeting.id, "meeting has no host; skipping calendar event");
            self.log(meeting, run_id, LogLevel::Warn, "no host user; calendar event skipped")
                .await;
            return Ok(CalendarWriteResult::SkippedNoHost);
        };

        let (starts_at, ends_at) = match (meeting.starts_at, meeting.ends_at) {
            (Some(s), Some(e)) => (s, e),
            _ => {
                return Err(bookline_domain::BooklineError::InvalidInput(
                    "meeting has no confirmed times".into(),
                ))
            }
        };

        let host = self
            .directory
            .user(host_user_id)
            .await?
            .ok_or_else(|| {
                bookline_domain::BooklineError::NotFound(format!("host user {host_user_id}"))
            })?;

        let mut attendees = Vec::new();
        for user_id in &meeting.participant_user_ids {
            match self.directory.user(user_id).await? {
                Some(user) => attendees.push(EventAttendee::person(user.email)),
                None => {
                    warn!(user_id, "participant not found; omitted from calendar event");
                }
            }
        }
        attendees.push(EventAttendee::person(meeting.client_email.clone()));

        if meeting.location_mode == LocationMode::InPerson {
            if let Some(room_id) = meeting.room_id.as_deref() {
                if let Some(room) = self.directory.room(room_id).await? {
                    if let Some(address) = room.resource_address {
                        attendees.push(EventAttendee::room(address));
                    }
                }
            }
        }

        let spec = EventSpec {
            calendar_id: host.email.clone(),
            host_user_id: host.id.clone(),
            summary: meeting.title.clone(),
            description: format!("Booking with {}", meeting.client_name),
            starts_at,
            ends_at,
            timezone: meeting.timezone.clone(),
            attendees,
            send_updates: true,
        };

        self.log(meeting, run_id, LogLevel::Info, "creating calendar event").await;
        let created = self.events.create_event(&spec).await?;
        self.log(meeting, run_id, LogLevel::Success, "calendar event created").await;
        Ok(CalendarWriteResult::Created(created))
    }

    async fn log(&self, meeting: &Meeting, run_id: &str, level: LogLevel, message: &str) {
        self.progress
            .append(ProgressLogEntry {
                meeting_id: meeting.id.clone(),
                run_id: run_id.to_string(),
                step: "calendar:event".to_string(),
                level,
                message: message.to_string(),
                details: None,
                created_at: self.clock.now(),
            })
            .await;
    }
}
