//! Calendar provider integration: free/busy reads and event writes.

pub mod ports;
pub mod service;

pub use ports::{
    CalendarEvents, ConnectionRepository, CreatedEvent, EventAttendee, EventSpec,
    FreeBusyProvider,
};
pub use service::{CalendarEventService, CalendarWriteResult};
