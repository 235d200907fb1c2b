//! Booking request (capability link) types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::meeting::Meeting;
use crate::errors::IntegrationSystem;

/// Lifecycle of a booking link. Only one `Open` request may exist per
/// meeting at a time; expiry is absolute and checked on every access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingRequestStatus {
    Open,
    Completed,
    Expired,
}

impl BookingRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Completed => "completed",
            Self::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "completed" => Some(Self::Completed),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

/// A booking link issued by a staff member. The public token is the sole
/// capability credential; resolving `/r/{token}` requires no other auth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub id: String,
    pub meeting_id: String,
    pub public_token: String,
    pub expires_at: DateTime<Utc>,
    pub status: BookingRequestStatus,
}

impl BookingRequest {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Non-fatal integration failure surfaced alongside a successful booking.
///
/// The booking's commit point (meeting status → `Booked`) precedes every
/// external call, so external failures accumulate here instead of undoing
/// the booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationWarning {
    pub system: IntegrationSystem,
    pub message: String,
}

/// Result of a booking confirmation: the committed meeting plus whatever
/// warnings the external writers produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub meeting: Meeting,
    pub run_id: String,
    pub warnings: Vec<IntegrationWarning>,
}
