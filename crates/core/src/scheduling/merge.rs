//! Busy interval consolidation
//!
//! Raw busy intervals arrive unsorted and overlapping, often from several
//! calendars at once. Everything downstream (gap computation, slot
//! emission) assumes a minimal sorted disjoint set, produced here.

use bookline_domain::BusyInterval;

/// Merge raw busy intervals into a minimal sorted non-overlapping set.
///
/// Sort by start ascending, then fold adjacent/overlapping intervals
/// (overlap test: `next.start <= current.end`) taking the max end.
/// Invariant: `output[i].end <= output[i+1].start` for all i, and the union
/// of outputs equals the union of inputs. O(n log n).
pub fn merge_busy_intervals(mut intervals: Vec<BusyInterval>) -> Vec<BusyInterval> {
    // Zero-length and inverted intervals carry no busy time.
    intervals.retain(|iv| iv.start < iv.end);
    if intervals.is_empty() {
        return intervals;
    }

    intervals.sort_by_key(|iv| iv.start);

    let mut merged: Vec<BusyInterval> = Vec::with_capacity(intervals.len());
    for next in intervals {
        match merged.last_mut() {
            Some(current) if next.start <= current.end => {
                current.end = current.end.max(next.end);
            }
            _ => merged.push(next),
        }
    }
    merged
}
