//! Unix-epoch column helpers shared by the repositories.

use bookline_domain::{BooklineError, Result};
use chrono::{DateTime, TimeZone, Utc};

pub fn to_secs(dt: DateTime<Utc>) -> i64 {
    dt.timestamp()
}

pub fn from_secs(secs: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| BooklineError::Database(format!("timestamp out of range: {secs}")))
}

pub fn opt_to_secs(dt: Option<DateTime<Utc>>) -> Option<i64> {
    dt.map(to_secs)
}

pub fn opt_from_secs(secs: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    secs.map(from_secs).transpose()
}

pub fn to_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

pub fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| BooklineError::Database(format!("timestamp out of range: {millis}")))
}
