//! Availability resolution: timezone normalization, busy-interval merging,
//! and candidate slot generation.

pub mod merge;
pub mod slots;
pub mod timezone;

pub use merge::merge_busy_intervals;
pub use slots::{generate_slots, SlotQuery};
pub use timezone::{normalize, select_zone, LocalParts};
