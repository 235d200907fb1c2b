//! Booking confirmation orchestration and its persistence ports.

pub mod ports;
pub mod service;

pub use ports::{BookingRequestRepository, Directory, MeetingRepository};
pub use service::{BookingService, CrmWriteSettings};
