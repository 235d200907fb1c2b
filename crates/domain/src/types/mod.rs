//! Domain types and models

pub mod appointment;
pub mod booking;
pub mod meeting;
pub mod progress;
pub mod scheduling;

pub use appointment::{
    AppointmentAttempt, AppointmentOutcome, Envelope, RequiredField, TimeFormat,
};
pub use booking::{BookingConfirmation, BookingRequest, BookingRequestStatus, IntegrationWarning};
pub use meeting::{CalendarConnection, LocationMode, Meeting, MeetingStatus, Room, User};
pub use progress::{LogLevel, ProgressLogEntry};
pub use scheduling::{BusyInterval, TimeSlot};
