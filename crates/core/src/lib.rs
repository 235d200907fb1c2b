//! # Bookline Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Availability resolution (interval merging, slot generation)
//! - The external appointment create→verify→repair state machine
//! - Calendar event assembly
//! - The booking confirmation service
//! - Port/adapter interfaces (traits) for everything impure
//!
//! ## Architecture Principles
//! - Only depends on `bookline-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod appointment;
pub mod booking;
pub mod calendar;
pub mod progress;
pub mod scheduling;
pub mod time;

// Re-export specific items to avoid ambiguity
pub use appointment::ports::{AppointmentApi, CrmResponse};
pub use appointment::writer::{AppointmentRequest, AppointmentWriter, RunContext};
pub use booking::ports::{BookingRequestRepository, Directory, MeetingRepository};
pub use booking::service::{BookingService, CrmWriteSettings};
pub use calendar::ports::{
    CalendarEvents, ConnectionRepository, CreatedEvent, EventAttendee, EventSpec,
    FreeBusyProvider,
};
pub use calendar::service::{CalendarEventService, CalendarWriteResult};
pub use progress::memory::MemoryProgressSink;
pub use progress::ports::ProgressSink;
pub use scheduling::merge::merge_busy_intervals;
pub use scheduling::slots::{generate_slots, SlotQuery};
pub use scheduling::timezone::{normalize, select_zone, LocalParts};
pub use time::clock::{Clock, MockClock, SystemClock};
