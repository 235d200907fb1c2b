//! Google Calendar integration: token refresh, free/busy reads, and event
//! writes.

pub mod auth;
pub mod events;
pub mod freebusy;
pub mod types;

pub use auth::GoogleTokenProvider;
pub use events::GoogleCalendarEvents;
pub use freebusy::GoogleFreeBusy;
