//! Timezone normalization
//!
//! Converts absolute instants into calendar-local date/time parts for a
//! given IANA zone. Used by every component that must speak to a system
//! expecting local wall-clock fields instead of instants.

use bookline_domain::constants::DEFAULT_TIMEZONE;
use bookline_domain::{BooklineError, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Wall-clock representation of an instant in a specific zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalParts {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:mm`
    pub time_hm: String,
    /// `HH:mm:ss`
    pub time_hms: String,
}

/// Resolve an IANA zone identifier.
pub fn parse_zone(zone: &str) -> Result<Tz> {
    zone.parse::<Tz>().map_err(|_| BooklineError::InvalidTimezone(zone.to_string()))
}

/// Compute the wall-clock parts of `instant` in `zone`.
///
/// Correct across DST transitions: the conversion goes through the zone's
/// offset for that specific instant, never a fixed offset.
pub fn normalize(instant: DateTime<Utc>, zone: &str) -> Result<LocalParts> {
    let tz = parse_zone(zone)?;
    let local = instant.with_timezone(&tz);
    Ok(LocalParts {
        date: local.format("%Y-%m-%d").to_string(),
        time_hm: local.format("%H:%M").to_string(),
        time_hms: local.format("%H:%M:%S").to_string(),
    })
}

/// Pick the zone an external CRM payload should be rendered in.
///
/// Priority: the CRM's own user timezone (the CRM renders times in its
/// user's zone regardless of what the caller sends) > the meeting's
/// configured zone > the hard-coded default. Matching the CRM's assumption
/// avoids silent off-by-hours errors.
pub fn select_zone(crm_user_zone: Option<&str>, meeting_zone: &str) -> Tz {
    if let Some(zone) = crm_user_zone {
        if let Ok(tz) = parse_zone(zone) {
            return tz;
        }
    }
    parse_zone(meeting_zone).unwrap_or_else(|_| {
        parse_zone(DEFAULT_TIMEZONE).unwrap_or(chrono_tz::America::New_York)
    })
}
