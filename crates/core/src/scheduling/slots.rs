//! Candidate slot generation
//!
//! Walks a search window day by day, subtracting merged busy intervals, the
//! fixed lunch block, and the minimum-notice cutoff from business hours.
//! All interval math happens on UTC instants; the client timezone is used
//! for label rendering only, so DST transitions cannot shift slot
//! boundaries.

use bookline_domain::constants::{
    BUSINESS_DAY_END_HOUR, BUSINESS_DAY_START_HOUR, LUNCH_END_HOUR, LUNCH_START_HOUR, MAX_SLOTS,
    MIN_NOTICE_MINUTES, SLOT_STEP_MINUTES,
};
use bookline_domain::{BusyInterval, TimeSlot};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use super::merge::merge_busy_intervals;

/// Parameters for one slot-generation pass.
#[derive(Debug, Clone)]
pub struct SlotQuery {
    /// First calendar day of the search window (inclusive).
    pub window_start: NaiveDate,
    /// End of the search window (exclusive).
    pub window_end: NaiveDate,
    pub duration_minutes: i64,
    /// Zone the business-hours wall clock is expressed in.
    pub business_tz: Tz,
    /// Zone slot labels are rendered in. Labels only; no interval math.
    pub client_tz: Tz,
    /// Injected "now" for the minimum-notice cutoff.
    pub now: DateTime<Utc>,
}

/// Generate bounded candidate slots for the query.
///
/// Lunch is modeled as one more busy interval per day rather than a special
/// case, which guarantees no slot straddles it (same for end of business
/// hours, which bounds the final gap). Slots are emitted chronologically in
/// a single pass; emission stops at the global cap.
pub fn generate_slots(query: &SlotQuery, busy: &[BusyInterval]) -> Vec<TimeSlot> {
    let merged = merge_busy_intervals(busy.to_vec());
    let duration = Duration::minutes(query.duration_minutes);
    let step = Duration::minutes(SLOT_STEP_MINUTES);
    let cutoff = query.now + Duration::minutes(MIN_NOTICE_MINUTES);

    let mut slots = Vec::new();
    let mut day = query.window_start;

    'days: while day < query.window_end {
        if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            day = next_day(day);
            continue;
        }

        // A day whose boundaries do not resolve (DST gap on the boundary
        // itself) offers no slots rather than guessing an offset.
        let bounds = day_bounds(day, query.business_tz);
        let Some((day_start, day_end, lunch)) = bounds else {
            day = next_day(day);
            continue;
        };

        let mut day_busy: Vec<BusyInterval> = merged
            .iter()
            .filter(|iv| iv.start < day_end && day_start < iv.end)
            .map(|iv| BusyInterval::new(iv.start.max(day_start), iv.end.min(day_end)))
            .collect();
        day_busy.push(lunch);
        let day_busy = merge_busy_intervals(day_busy);

        for (gap_start, gap_end) in free_gaps(day_start, day_end, &day_busy) {
            let mut start = align_to_grid(gap_start, day_start, step);
            while start + duration <= gap_end {
                if start >= cutoff {
                    slots.push(render_slot(start, start + duration, query.client_tz));
                    if slots.len() >= MAX_SLOTS {
                        break 'days;
                    }
                }
                start += step;
            }
        }

        day = next_day(day);
    }

    slots
}

fn next_day(day: NaiveDate) -> NaiveDate {
    day.succ_opt().unwrap_or(NaiveDate::MAX)
}

/// Resolve the day's business-hour boundaries and lunch block as UTC
/// instants in the business timezone.
fn day_bounds(day: NaiveDate, tz: Tz) -> Option<(DateTime<Utc>, DateTime<Utc>, BusyInterval)> {
    let at = |hour: u32| -> Option<DateTime<Utc>> {
        let naive = day.and_hms_opt(hour, 0, 0)?;
        tz.from_local_datetime(&naive).earliest().map(|dt| dt.with_timezone(&Utc))
    };
    let day_start = at(BUSINESS_DAY_START_HOUR)?;
    let day_end = at(BUSINESS_DAY_END_HOUR)?;
    let lunch = BusyInterval::new(at(LUNCH_START_HOUR)?, at(LUNCH_END_HOUR)?);
    Some((day_start, day_end, lunch))
}

/// Subtract a sorted disjoint busy set from `[day_start, day_end)`.
fn free_gaps(
    day_start: DateTime<Utc>,
    day_end: DateTime<Utc>,
    busy: &[BusyInterval],
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut gaps = Vec::new();
    let mut cursor = day_start;
    for iv in busy {
        if iv.start > cursor {
            gaps.push((cursor, iv.start));
        }
        cursor = cursor.max(iv.end);
    }
    if cursor < day_end {
        gaps.push((cursor, day_end));
    }
    gaps
}

/// First instant at or after `from` on the day's 30-minute grid.
fn align_to_grid(from: DateTime<Utc>, day_start: DateTime<Utc>, step: Duration) -> DateTime<Utc> {
    let offset = (from - day_start).num_minutes();
    let step_min = step.num_minutes();
    let rem = offset.rem_euclid(step_min);
    if rem == 0 {
        from
    } else {
        from + Duration::minutes(step_min - rem)
    }
}

fn render_slot(start: DateTime<Utc>, end: DateTime<Utc>, client_tz: Tz) -> TimeSlot {
    let local_start = start.with_timezone(&client_tz);
    let local_end = end.with_timezone(&client_tz);
    let label = format!(
        "{} – {}",
        local_start.format("%a, %b %-d %H:%M"),
        local_end.format("%H:%M")
    );
    TimeSlot { start, end, label }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::Tz;

    use super::*;

    const UTC_TZ: Tz = chrono_tz::UTC;

    fn hm(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, h, m, 0).single().unwrap()
    }

    // 2025-06-02 is a Monday.
    fn monday_query(now: DateTime<Utc>) -> SlotQuery {
        SlotQuery {
            window_start: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            window_end: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            duration_minutes: 30,
            business_tz: UTC_TZ,
            client_tz: UTC_TZ,
            now,
        }
    }

    #[test]
    fn scenario_busy_morning_skips_lunch() {
        // Business hours 09:00-17:00, lunch 12:00-13:00, busy 09:00-10:00,
        // duration 30min, now 08:00: first slot 10:00, lunch skipped,
        // last slot starts 16:30.
        let busy = vec![BusyInterval::new(hm(2, 9, 0), hm(2, 10, 0))];
        let slots = generate_slots(&monday_query(hm(2, 8, 0)), &busy);

        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts.first(), Some(&hm(2, 10, 0)));
        assert_eq!(starts.get(1), Some(&hm(2, 10, 30)));
        assert_eq!(starts.last(), Some(&hm(2, 16, 30)));
        // Morning 10:00-11:30 starts, afternoon resumes at 13:00.
        assert!(starts.contains(&hm(2, 11, 30)));
        assert!(!starts.contains(&hm(2, 12, 0)));
        assert!(!starts.contains(&hm(2, 12, 30)));
        assert!(starts.contains(&hm(2, 13, 0)));
        assert_eq!(starts.len(), 4 + 8);
    }

    #[test]
    fn slot_safety_no_busy_overlap_and_min_notice() {
        let busy = vec![
            BusyInterval::new(hm(2, 10, 15), hm(2, 11, 5)),
            BusyInterval::new(hm(2, 14, 0), hm(2, 15, 30)),
        ];
        let now = hm(2, 9, 45); // cutoff 10:45
        let slots = generate_slots(&monday_query(now), &busy);
        assert!(!slots.is_empty());

        let lunch = BusyInterval::new(hm(2, 12, 0), hm(2, 13, 0));
        for slot in &slots {
            let as_interval = BusyInterval::new(slot.start, slot.end);
            assert!(slot.start >= now + Duration::minutes(MIN_NOTICE_MINUTES));
            assert!(!as_interval.overlaps(&lunch), "slot straddles lunch: {slot:?}");
            for iv in &busy {
                assert!(!as_interval.overlaps(iv), "slot overlaps busy: {slot:?}");
            }
            // 30-minute grid relative to 09:00.
            assert_eq!((slot.start - hm(2, 9, 0)).num_minutes() % 30, 0);
        }
    }

    #[test]
    fn weekends_are_excluded() {
        // 2025-06-07/08 are Sat/Sun.
        let query = SlotQuery {
            window_start: NaiveDate::from_ymd_opt(2025, 6, 7).unwrap(),
            window_end: NaiveDate::from_ymd_opt(2025, 6, 9).unwrap(),
            duration_minutes: 30,
            business_tz: UTC_TZ,
            client_tz: UTC_TZ,
            now: hm(1, 0, 0),
        };
        assert!(generate_slots(&query, &[]).is_empty());
    }

    #[test]
    fn emission_caps_at_thirty_slots() {
        let query = SlotQuery {
            window_start: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            window_end: NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
            duration_minutes: 30,
            business_tz: UTC_TZ,
            client_tz: UTC_TZ,
            now: hm(1, 0, 0),
        };
        let slots = generate_slots(&query, &[]);
        assert_eq!(slots.len(), MAX_SLOTS);
        // Chronological single-pass emission.
        for pair in slots.windows(2) {
            assert!(pair[0].start < pair[1].start);
        }
    }

    #[test]
    fn gap_shorter_than_duration_emits_nothing() {
        // Free only 11:15-12:00 (45min) against a 60-minute duration;
        // aligned start 11:30 leaves 30min, so nothing fits before lunch.
        let busy = vec![
            BusyInterval::new(hm(2, 9, 0), hm(2, 11, 15)),
            BusyInterval::new(hm(2, 13, 0), hm(2, 17, 0)),
        ];
        let mut query = monday_query(hm(2, 8, 0));
        query.duration_minutes = 60;
        assert!(generate_slots(&query, &busy).is_empty());
    }

    #[test]
    fn labels_render_in_client_zone() {
        let mut query = monday_query(hm(2, 8, 0));
        query.client_tz = chrono_tz::America::New_York;
        let busy = vec![BusyInterval::new(hm(2, 9, 0), hm(2, 16, 30))];
        let slots = generate_slots(&query, &busy);
        assert_eq!(slots.len(), 1);
        // 16:30 UTC is 12:30 EDT.
        assert!(slots[0].label.contains("12:30"), "label was {}", slots[0].label);
    }
}
