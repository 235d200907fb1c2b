//! Scheduling policy and integration budget constants
//!
//! Centralized location for all domain-level constants used throughout the
//! engine.

// Slot generation policy
pub const BUSINESS_DAY_START_HOUR: u32 = 9;
pub const BUSINESS_DAY_END_HOUR: u32 = 17;
pub const LUNCH_START_HOUR: u32 = 12;
pub const LUNCH_END_HOUR: u32 = 13;
pub const SLOT_STEP_MINUTES: i64 = 30;
pub const MIN_NOTICE_MINUTES: i64 = 60;
/// Safety bound against pathological free windows.
pub const MAX_SLOTS: usize = 30;

/// Fallback zone when neither the CRM user zone nor the meeting zone
/// resolves. The CRM renders times in its own user's zone, so this is the
/// last resort, not the first choice.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

// External call budgets (seconds). Exceeding one surfaces as
// `BooklineError::Timeout`, never as a generic network error.
pub const FREEBUSY_TIMEOUT_SECS: u64 = 15;
pub const CRM_CALL_TIMEOUT_SECS: u64 = 30;
pub const CALENDAR_WRITE_TIMEOUT_SECS: u64 = 30;
pub const PROGRESS_WAIT_TIMEOUT_SECS: u64 = 60;

/// Refresh an OAuth access token this many seconds before it expires.
pub const TOKEN_REFRESH_THRESHOLD_SECS: i64 = 300;

/// Terminal step name a progress-log consumer watches for.
pub const PROGRESS_STEP_DONE: &str = "done";
