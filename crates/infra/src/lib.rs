//! # Bookline Infra
//!
//! Infrastructure layer: SQLite persistence, HTTP integrations, and the
//! durable progress sink. Everything here implements a port defined in
//! `bookline-core`; nothing in this crate contains booking policy.

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod progress;

pub use database::{
    DbManager, SqliteBookingRequestRepository, SqliteConnectionRepository, SqliteDirectory,
    SqliteMeetingRepository,
};
pub use errors::InfraError;
pub use http::HttpClient;
pub use integrations::crm::CrmClient;
pub use integrations::google::{GoogleCalendarEvents, GoogleFreeBusy, GoogleTokenProvider};
pub use progress::SqliteProgressSink;
