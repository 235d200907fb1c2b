//! Booking confirmation service
//!
//! One sequential request-scoped execution per confirmation: validate the
//! capability token, commit the meeting (the booking's point of no return),
//! then run the appointment writer and the calendar event writer one after
//! another, each independently non-fatal, each logging into the progress
//! sink under the run's id.

use std::sync::Arc;

use bookline_domain::{
    BookingConfirmation, BookingRequest, BookingRequestStatus, BooklineError, IntegrationSystem,
    IntegrationWarning, LogLevel, Meeting, MeetingStatus, ProgressLogEntry, Result, TimeSlot,
};
use bookline_domain::constants::PROGRESS_STEP_DONE;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::ports::{BookingRequestRepository, Directory, MeetingRepository};
use crate::appointment::contacts::ContactResolver;
use crate::appointment::payload::CanonicalAppointment;
use crate::appointment::ports::AppointmentApi;
use crate::appointment::verify::VerifyExpectation;
use crate::appointment::writer::{AppointmentRequest, AppointmentWriter, RunContext};
use crate::calendar::ports::FreeBusyProvider;
use crate::calendar::service::{CalendarEventService, CalendarWriteResult};
use crate::progress::ports::ProgressSink;
use crate::scheduling::slots::{generate_slots, SlotQuery};
use crate::scheduling::timezone::{parse_zone, select_zone};
use crate::time::clock::Clock;

/// CRM-side write configuration shared by all bookings.
#[derive(Debug, Clone)]
pub struct CrmWriteSettings {
    pub event_type_id: i64,
    /// CRM location for in-person meetings, when configured.
    pub location_id: Option<i64>,
}

/// Orchestrates availability queries and booking confirmations.
pub struct BookingService {
    meetings: Arc<dyn MeetingRepository>,
    requests: Arc<dyn BookingRequestRepository>,
    directory: Arc<dyn Directory>,
    free_busy: Arc<dyn FreeBusyProvider>,
    crm: Arc<dyn AppointmentApi>,
    calendar: CalendarEventService,
    progress: Arc<dyn ProgressSink>,
    clock: Arc<dyn Clock>,
    crm_settings: CrmWriteSettings,
}

impl BookingService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        meetings: Arc<dyn MeetingRepository>,
        requests: Arc<dyn BookingRequestRepository>,
        directory: Arc<dyn Directory>,
        free_busy: Arc<dyn FreeBusyProvider>,
        crm: Arc<dyn AppointmentApi>,
        calendar: CalendarEventService,
        progress: Arc<dyn ProgressSink>,
        clock: Arc<dyn Clock>,
        crm_settings: CrmWriteSettings,
    ) -> Self {
        Self {
            meetings,
            requests,
            directory,
            free_busy,
            crm,
            calendar,
            progress,
            clock,
            crm_settings,
        }
    }

    /// Issue a fresh booking link for a meeting, expiring any previous open
    /// one so at most one request is `Open` per meeting.
    pub async fn issue_link(&self, meeting_id: &str, ttl: Duration) -> Result<BookingRequest> {
        let meeting = self
            .meetings
            .get(meeting_id)
            .await?
            .ok_or_else(|| BooklineError::NotFound(format!("meeting {meeting_id}")))?;

        if let Some(open) = self.requests.find_open_for_meeting(&meeting.id).await? {
            self.requests.set_status(&open.id, BookingRequestStatus::Expired).await?;
        }

        let request = BookingRequest {
            id: Uuid::new_v4().to_string(),
            meeting_id: meeting.id,
            public_token: Uuid::new_v4().simple().to_string(),
            expires_at: self.clock.now() + ttl,
            status: BookingRequestStatus::Open,
        };
        self.requests.insert(&request).await?;
        Ok(request)
    }

    /// Resolve a capability token to its request and meeting, enforcing
    /// expiry and completion before anything else happens.
    pub async fn resolve_request(&self, token: &str) -> Result<(BookingRequest, Meeting)> {
        let request = self
            .requests
            .find_by_token(token)
            .await?
            .ok_or_else(|| BooklineError::Validation("booking link not found".into()))?;

        match request.status {
            BookingRequestStatus::Completed => {
                return Err(BooklineError::Validation("booking already completed".into()));
            }
            BookingRequestStatus::Expired => {
                return Err(BooklineError::Validation("booking link expired".into()));
            }
            BookingRequestStatus::Open if request.is_expired(self.clock.now()) => {
                // Best effort: the absolute expiry check above is what gates.
                let _ = self
                    .requests
                    .set_status(&request.id, BookingRequestStatus::Expired)
                    .await;
                return Err(BooklineError::Validation("booking link expired".into()));
            }
            BookingRequestStatus::Open => {}
        }

        let meeting = self
            .meetings
            .get(&request.meeting_id)
            .await?
            .ok_or_else(|| BooklineError::NotFound(format!("meeting {}", request.meeting_id)))?;
        Ok((request, meeting))
    }

    /// Offered slots for the meeting behind a booking link.
    ///
    /// Free/busy is queried for the host and all internal participants; the
    /// merged result feeds the slot generator. `client_zone` affects label
    /// rendering only.
    #[instrument(skip(self))]
    pub async fn available_slots(
        &self,
        token: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
        client_zone: Option<&str>,
    ) -> Result<Vec<TimeSlot>> {
        let (_, meeting) = self.resolve_request(token).await?;
        let business_tz = parse_zone(&meeting.timezone)?;
        let client_tz = select_zone(client_zone, &meeting.timezone);

        let calendar_ids = self.participant_calendars(&meeting).await?;
        let busy = if calendar_ids.is_empty() {
            Vec::new()
        } else {
            let time_min = local_midnight(window_start, business_tz)?;
            let time_max = local_midnight(window_end, business_tz)?;
            self.free_busy.free_busy(time_min, time_max, &calendar_ids).await?
        };

        let query = SlotQuery {
            window_start,
            window_end,
            duration_minutes: meeting.duration_minutes,
            business_tz,
            client_tz,
            now: self.clock.now(),
        };
        Ok(generate_slots(&query, &busy))
    }

    /// Confirm a booking: validate, commit the meeting, then best-effort
    /// propagate into the CRM and the calendar provider.
    ///
    /// External failures come back as `warnings` on a successful
    /// confirmation — the commit precedes every external call and is never
    /// undone by their failure.
    #[instrument(skip(self, token), fields(meeting_id))]
    pub async fn confirm(
        &self,
        token: &str,
        starts_at: DateTime<Utc>,
    ) -> Result<BookingConfirmation> {
        let (request, mut meeting) = self.resolve_request(token).await?;
        let run_id = Uuid::new_v4().to_string();

        // A retried confirmation that already completed external writes is
        // answered idempotently, with no re-creation.
        if meeting.status == MeetingStatus::Booked && meeting.has_external_appointment() {
            info!(meeting_id = %meeting.id, "confirmation retried; external records exist");
            return Ok(BookingConfirmation { meeting, run_id, warnings: Vec::new() });
        }

        // Commit point. Failing to write the meeting row is the only hard
        // failure in this flow.
        meeting.starts_at = Some(starts_at);
        meeting.ends_at = Some(starts_at + Duration::minutes(meeting.duration_minutes));
        meeting.status = MeetingStatus::Booked;
        self.meetings.update(&meeting).await?;
        self.requests.set_status(&request.id, BookingRequestStatus::Completed).await?;

        let run = RunContext { meeting_id: meeting.id.clone(), run_id: run_id.clone() };
        self.log(&run, "start", LogLevel::Info, "booking committed; writing external systems")
            .await;

        let mut warnings = Vec::new();
        if let Err(err) = self.run_crm_flow(&mut meeting, &run, &mut warnings).await {
            match err {
                fatal @ BooklineError::Database(_) => return Err(fatal),
                other => {
                    self.log(&run, "crm", LogLevel::Error, &other.to_string()).await;
                    warnings.push(warning(IntegrationSystem::Crm, &other.to_string()));
                }
            }
        }

        if let Err(err) = self.run_calendar_flow(&mut meeting, &run, &mut warnings).await {
            match err {
                fatal @ BooklineError::Database(_) => return Err(fatal),
                other => {
                    self.log(&run, "calendar", LogLevel::Error, &other.to_string()).await;
                    warnings.push(warning(IntegrationSystem::Calendar, &other.to_string()));
                }
            }
        }

        self.log(&run, PROGRESS_STEP_DONE, LogLevel::Success, "booking flow complete").await;
        Ok(BookingConfirmation { meeting, run_id, warnings })
    }

    /// Cancel a booked meeting, clearing the external appointment linkage so
    /// a future booking re-creates it. Contact and matter IDs identify the
    /// client, not the appointment, and are kept.
    pub async fn cancel(&self, meeting_id: &str) -> Result<Meeting> {
        self.close_meeting(meeting_id, MeetingStatus::Cancelled).await
    }

    /// Mark a meeting rescheduled; external linkage is cleared the same way
    /// as for cancellation so the new confirmation writes fresh records.
    pub async fn reschedule(&self, meeting_id: &str) -> Result<Meeting> {
        self.close_meeting(meeting_id, MeetingStatus::Rescheduled).await
    }

    async fn close_meeting(&self, meeting_id: &str, status: MeetingStatus) -> Result<Meeting> {
        let mut meeting = self
            .meetings
            .get(meeting_id)
            .await?
            .ok_or_else(|| BooklineError::NotFound(format!("meeting {meeting_id}")))?;
        meeting.status = status;
        meeting.external_appointment_id = None;
        meeting.calendar_event_id = None;
        meeting.starts_at = None;
        meeting.ends_at = None;
        self.meetings.update(&meeting).await?;
        Ok(meeting)
    }

    /// CRM sub-flow: contact → matter → appointment writer. Integration
    /// failures are converted to warnings here; only meeting-row write
    /// failures escape as `Err`.
    async fn run_crm_flow(
        &self,
        meeting: &mut Meeting,
        run: &RunContext,
        warnings: &mut Vec<IntegrationWarning>,
    ) -> Result<()> {
        if meeting.has_external_appointment() {
            self.log(run, "crm", LogLevel::Info, "appointment already persisted; skipping").await;
            return Ok(());
        }

        let host = match meeting.host_user_id.as_deref() {
            Some(id) => match self.directory.user(id).await {
                Ok(user) => user,
                Err(err) => {
                    warn!(error = %err, "host lookup failed; writing appointment without owner");
                    None
                }
            },
            None => None,
        };

        let resolver = ContactResolver::new(self.crm.clone());
        let contact_id = match resolver
            .resolve_contact(
                meeting.external_contact_id,
                &meeting.client_email,
                &meeting.client_name,
            )
            .await
        {
            Ok(id) => {
                if meeting.external_contact_id != Some(id) {
                    meeting.external_contact_id = Some(id);
                    self.meetings.update(meeting).await?;
                }
                Some(id)
            }
            Err(err) => {
                warnings.push(warning(IntegrationSystem::Crm, &err.to_string()));
                None
            }
        };

        if let Some(contact_id) = contact_id {
            match resolver
                .resolve_matter(meeting.external_matter_id, contact_id, &meeting.title)
                .await
            {
                Ok(id) => {
                    if meeting.external_matter_id != Some(id) {
                        meeting.external_matter_id = Some(id);
                        self.meetings.update(meeting).await?;
                    }
                }
                Err(err) => warnings.push(warning(IntegrationSystem::Crm, &err.to_string())),
            }
        }

        let (starts_at, ends_at) = match (meeting.starts_at, meeting.ends_at) {
            (Some(s), Some(e)) => (s, e),
            _ => {
                return Err(BooklineError::Internal(
                    "confirmed meeting is missing times".into(),
                ))
            }
        };

        let zone =
            select_zone(host.as_ref().and_then(|u| u.crm_timezone.as_deref()), &meeting.timezone);
        let location_id = if meeting.location_mode == bookline_domain::LocationMode::InPerson {
            self.crm_settings.location_id
        } else {
            None
        };
        let appointment = CanonicalAppointment {
            name: meeting.title.clone(),
            description: format!(
                "Booking with {} <{}>",
                meeting.client_name, meeting.client_email
            ),
            starts_at,
            ends_at,
            timezone: zone.name().to_string(),
            user_id: host.as_ref().and_then(|u| u.crm_user_id),
            contact_id,
            event_type_id: self.crm_settings.event_type_id,
            location_id,
        };
        let expect = VerifyExpectation {
            require_location: location_id.is_some(),
            require_contact: contact_id.is_some(),
        };

        let writer =
            AppointmentWriter::new(self.crm.clone(), self.progress.clone(), self.clock.clone());
        let outcome = writer.write(run, &AppointmentRequest { appointment, expect }).await;

        // Store whatever ID exists: a verified record links the booking, an
        // incomplete one is kept for manual follow-up.
        if let Some(id) = outcome.created_id {
            meeting.external_appointment_id = Some(id);
            self.meetings.update(meeting).await?;
        }
        if !outcome.persisted {
            let message = if outcome.created_id.is_some() {
                "appointment created but incomplete; flagged for manual follow-up"
            } else {
                "appointment creation failed"
            };
            warnings.push(warning(IntegrationSystem::Crm, message));
        }
        Ok(())
    }

    async fn run_calendar_flow(
        &self,
        meeting: &mut Meeting,
        run: &RunContext,
        warnings: &mut Vec<IntegrationWarning>,
    ) -> Result<()> {
        if meeting.calendar_event_id.is_some() {
            self.log(run, "calendar", LogLevel::Info, "calendar event exists; skipping").await;
            return Ok(());
        }

        match self.calendar.create_for_meeting(meeting, &run.run_id).await {
            Ok(CalendarWriteResult::Created(event)) => {
                meeting.calendar_event_id = Some(event.id);
                self.meetings.update(meeting).await?;
            }
            Ok(CalendarWriteResult::SkippedNoHost) => {
                warnings.push(warning(
                    IntegrationSystem::Calendar,
                    "meeting has no host user; calendar event skipped",
                ));
            }
            Err(err) => {
                self.log(run, "calendar", LogLevel::Error, &err.to_string()).await;
                warnings.push(warning(IntegrationSystem::Calendar, &err.to_string()));
            }
        }
        Ok(())
    }

    async fn participant_calendars(&self, meeting: &Meeting) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut user_ids: Vec<&str> = Vec::new();
        if let Some(host) = meeting.host_user_id.as_deref() {
            user_ids.push(host);
        }
        user_ids.extend(meeting.participant_user_ids.iter().map(String::as_str));

        for user_id in user_ids {
            if let Some(user) = self.directory.user(user_id).await? {
                if !ids.contains(&user.email) {
                    ids.push(user.email);
                }
            }
        }
        Ok(ids)
    }

    async fn log(&self, run: &RunContext, step: &str, level: LogLevel, message: &str) {
        self.progress
            .append(ProgressLogEntry {
                meeting_id: run.meeting_id.clone(),
                run_id: run.run_id.clone(),
                step: step.to_string(),
                level,
                message: message.to_string(),
                details: None,
                created_at: self.clock.now(),
            })
            .await;
    }
}

fn warning(system: IntegrationSystem, message: &str) -> IntegrationWarning {
    IntegrationWarning { system, message: message.to_string() }
}

fn local_midnight(date: NaiveDate, tz: chrono_tz::Tz) -> Result<DateTime<Utc>> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| BooklineError::InvalidInput(format!("invalid date {date}")))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| BooklineError::InvalidInput(format!("unresolvable local midnight {date}")))
}
