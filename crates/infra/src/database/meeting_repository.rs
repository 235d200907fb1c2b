//! SQLite-backed implementation of the MeetingRepository port.

use async_trait::async_trait;
use bookline_core::MeetingRepository;
use bookline_domain::{BooklineError, LocationMode, Meeting, MeetingStatus, Result};
use rusqlite::{params, Row};
use tracing::{debug, instrument};

use super::manager::SqlitePool;
use super::timestamps::{opt_from_secs, opt_to_secs};
use crate::errors::InfraError;

const MEETING_COLUMNS: &str = "id, title, duration_minutes, location_mode, timezone, \
     host_user_id, participant_user_ids, room_id, client_name, client_email, \
     starts_at, ends_at, status, external_appointment_id, external_contact_id, \
     external_matter_id, calendar_event_id";

pub struct SqliteMeetingRepository {
    pool: SqlitePool,
}

impl SqliteMeetingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new meeting row. Used by link issuance setup and tests; the
    /// booking flow itself only reads and updates.
    pub fn insert(&self, meeting: &Meeting) -> Result<()> {
        let conn = self.pool.get().map_err(|e| InfraError::from(e).0)?;
        let participants = serde_json::to_string(&meeting.participant_user_ids)
            .map_err(|e| InfraError::from(e).0)?;
        conn.execute(
            "INSERT INTO meetings (id, title, duration_minutes, location_mode, timezone,
                 host_user_id, participant_user_ids, room_id, client_name, client_email,
                 starts_at, ends_at, status, external_appointment_id, external_contact_id,
                 external_matter_id, calendar_event_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                meeting.id,
                meeting.title,
                meeting.duration_minutes,
                meeting.location_mode.as_str(),
                meeting.timezone,
                meeting.host_user_id,
                participants,
                meeting.room_id,
                meeting.client_name,
                meeting.client_email,
                opt_to_secs(meeting.starts_at),
                opt_to_secs(meeting.ends_at),
                meeting.status.as_str(),
                meeting.external_appointment_id,
                meeting.external_contact_id,
                meeting.external_matter_id,
                meeting.calendar_event_id,
            ],
        )
        .map_err(|e| InfraError::from(e).0)?;
        Ok(())
    }
}

#[async_trait]
impl MeetingRepository for SqliteMeetingRepository {
    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<Meeting>> {
        let conn = self.pool.get().map_err(|e| InfraError::from(e).0)?;
        let query = format!("SELECT {MEETING_COLUMNS} FROM meetings WHERE id = ?1");
        let result = conn.query_row(&query, params![id], meeting_from_row);
        match result {
            Ok(meeting) => Ok(Some(meeting?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(InfraError::from(e).0),
        }
    }

    #[instrument(skip(self, meeting), fields(meeting_id = %meeting.id))]
    async fn update(&self, meeting: &Meeting) -> Result<()> {
        let conn = self.pool.get().map_err(|e| InfraError::from(e).0)?;
        let participants = serde_json::to_string(&meeting.participant_user_ids)
            .map_err(|e| InfraError::from(e).0)?;
        let changed = conn
            .execute(
                "UPDATE meetings SET title = ?2, duration_minutes = ?3, location_mode = ?4,
                     timezone = ?5, host_user_id = ?6, participant_user_ids = ?7, room_id = ?8,
                     client_name = ?9, client_email = ?10, starts_at = ?11, ends_at = ?12,
                     status = ?13, external_appointment_id = ?14, external_contact_id = ?15,
                     external_matter_id = ?16, calendar_event_id = ?17
                 WHERE id = ?1",
                params![
                    meeting.id,
                    meeting.title,
                    meeting.duration_minutes,
                    meeting.location_mode.as_str(),
                    meeting.timezone,
                    meeting.host_user_id,
                    participants,
                    meeting.room_id,
                    meeting.client_name,
                    meeting.client_email,
                    opt_to_secs(meeting.starts_at),
                    opt_to_secs(meeting.ends_at),
                    meeting.status.as_str(),
                    meeting.external_appointment_id,
                    meeting.external_contact_id,
                    meeting.external_matter_id,
                    meeting.calendar_event_id,
                ],
            )
            .map_err(|e| InfraError::from(e).0)?;
        if changed == 0 {
            // The meeting is the booking's source of truth; its row vanishing
            // under an update is a storage fault, not a lookup miss.
            return Err(BooklineError::Database(format!(
                "meeting {} missing during update",
                meeting.id
            )));
        }
        debug!(meeting_id = %meeting.id, "meeting row updated");
        Ok(())
    }
}

/// Two-stage mapping: rusqlite errors for column access, domain errors for
/// value-level decoding (enum strings, JSON arrays, timestamps).
fn meeting_from_row(row: &Row<'_>) -> rusqlite::Result<Result<Meeting>> {
    let location_mode: String = row.get(3)?;
    let participants_json: String = row.get(6)?;
    let status: String = row.get(12)?;
    let starts_at: Option<i64> = row.get(10)?;
    let ends_at: Option<i64> = row.get(11)?;

    let id: String = row.get(0)?;
    let title: String = row.get(1)?;
    let duration_minutes: i64 = row.get(2)?;
    let timezone: String = row.get(4)?;
    let host_user_id: Option<String> = row.get(5)?;
    let room_id: Option<String> = row.get(7)?;
    let client_name: String = row.get(8)?;
    let client_email: String = row.get(9)?;
    let external_appointment_id: Option<i64> = row.get(13)?;
    let external_contact_id: Option<i64> = row.get(14)?;
    let external_matter_id: Option<i64> = row.get(15)?;
    let calendar_event_id: Option<String> = row.get(16)?;

    Ok((|| {
        let location_mode = LocationMode::parse(&location_mode).ok_or_else(|| {
            BooklineError::Database(format!("unknown location mode: {location_mode}"))
        })?;
        let status = MeetingStatus::parse(&status)
            .ok_or_else(|| BooklineError::Database(format!("unknown meeting status: {status}")))?;
        let participant_user_ids: Vec<String> = serde_json::from_str(&participants_json)
            .map_err(|e| BooklineError::Database(format!("invalid participant list: {e}")))?;

        Ok(Meeting {
            id,
            title,
            duration_minutes,
            location_mode,
            timezone,
            host_user_id,
            participant_user_ids,
            room_id,
            client_name,
            client_email,
            starts_at: opt_from_secs(starts_at)?,
            ends_at: opt_from_secs(ends_at)?,
            status,
            external_appointment_id,
            external_contact_id,
            external_matter_id,
            calendar_event_id,
        })
    })())
}
