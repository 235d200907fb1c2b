//! External appointment writer outcome types

use serde::{Deserialize, Serialize};

/// Time-of-day precision used in the canonical payload. Some CRM
/// deployments reject seconds precision, so `HourMinute` exists as a repair
/// fallback only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    HourMinuteSecond,
    HourMinute,
}

/// Request-body envelope shape. The CRM backend has been observed to
/// require different wrappers depending on deployment version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Envelope {
    Bare,
    Event,
    Data,
}

impl Envelope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bare => "bare",
            Self::Event => "event",
            Self::Data => "data",
        }
    }
}

/// A relationship or field the CRM must persist for the appointment record
/// to count as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Owner,
    StartTime,
    EndTime,
    StartDate,
    EndDate,
    EventType,
    Location,
    Contact,
}

impl RequiredField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::StartTime => "start_time",
            Self::EndTime => "end_time",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::EventType => "event_type",
            Self::Location => "location",
            Self::Contact => "contact",
        }
    }
}

/// One network step taken by the appointment writer. Ordered, append-only
/// within a single invocation; not persisted beyond the progress log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentAttempt {
    pub step: String,
    pub http_status: Option<u16>,
    pub ok: bool,
    pub note: String,
}

/// Terminal result of one appointment writer invocation.
///
/// `persisted == false` with a `created_id` means a genuinely
/// created-but-incomplete record: the caller must still store the ID for
/// manual follow-up. Total failure carries no ID at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentOutcome {
    pub persisted: bool,
    pub created_id: Option<i64>,
    pub readback: Option<serde_json::Value>,
    pub attempts: Vec<AppointmentAttempt>,
    pub used_time_format: TimeFormat,
}

impl AppointmentOutcome {
    /// Total failure: nothing was created in the CRM.
    pub fn failed(attempts: Vec<AppointmentAttempt>) -> Self {
        Self {
            persisted: false,
            created_id: None,
            readback: None,
            attempts,
            used_time_format: TimeFormat::HourMinuteSecond,
        }
    }
}
