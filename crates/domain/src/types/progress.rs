//! Progress log entries for asynchronous observability of a booking run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::PROGRESS_STEP_DONE;

/// Severity of a progress log entry. An `Error` entry is a terminal signal
/// for subscribers, same as a `done` step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Success,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Success => "success",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(Self::Info),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            "success" => Some(Self::Success),
            _ => None,
        }
    }
}

/// One append-only log record scoped to a confirmation run. Entries are
/// never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressLogEntry {
    pub meeting_id: String,
    pub run_id: String,
    pub step: String,
    pub level: LogLevel,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl ProgressLogEntry {
    /// Whether a poller or subscriber should stop waiting after this entry.
    pub fn is_terminal(&self) -> bool {
        self.step == PROGRESS_STEP_DONE || self.level == LogLevel::Error
    }
}
