//! Availability value types: busy intervals and candidate slots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A time range during which a participant's calendar is occupied, as
/// reported by a provider free/busy query. Ephemeral; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Half-open overlap test against another interval.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A candidate meeting time offered to a client. Value type with no
/// independent lifecycle: produced by the slot generator, consumed by the
/// client's selection step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Human-readable label rendered in the client's timezone.
    pub label: String,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, 0, 0).single().unwrap()
    }

    #[test]
    fn overlap_is_half_open() {
        let a = BusyInterval::new(at(9), at(10));
        let b = BusyInterval::new(at(10), at(11));
        let c = BusyInterval::new(at(9), at(11));
        assert!(!a.overlaps(&b), "touching intervals do not overlap");
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }
}
