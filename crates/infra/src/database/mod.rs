//! SQLite persistence: pool management, schema, and the repository
//! implementations behind the core ports.

pub mod booking_request_repository;
pub mod connection_repository;
pub mod directory_repository;
pub mod manager;
pub mod meeting_repository;
pub(crate) mod timestamps;

pub use booking_request_repository::SqliteBookingRequestRepository;
pub use connection_repository::SqliteConnectionRepository;
pub use directory_repository::SqliteDirectory;
pub use manager::{DbManager, SqliteConnection, SqlitePool};
pub use meeting_repository::SqliteMeetingRepository;
