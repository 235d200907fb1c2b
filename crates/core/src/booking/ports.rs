//! Persistence and directory ports for the booking flow
//!
//! All state the flow needs (meeting row, booking request, users, rooms) is
//! read fresh per invocation through these traits; nothing is cached across
//! requests.

use async_trait::async_trait;
use bookline_domain::{BookingRequest, BookingRequestStatus, Meeting, Result, Room, User};

/// Meeting rows. The update is a full-row write; the meeting is the
/// booking's source of truth and the only record whose write failure is
/// fatal.
#[async_trait]
pub trait MeetingRepository: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Meeting>>;
    async fn update(&self, meeting: &Meeting) -> Result<()>;
}

/// Booking link rows. The `Open → Completed` transition is the flow's
/// single-writer gate.
#[async_trait]
pub trait BookingRequestRepository: Send + Sync {
    async fn insert(&self, request: &BookingRequest) -> Result<()>;
    async fn find_by_token(&self, token: &str) -> Result<Option<BookingRequest>>;
    async fn find_open_for_meeting(&self, meeting_id: &str) -> Result<Option<BookingRequest>>;
    async fn set_status(&self, id: &str, status: BookingRequestStatus) -> Result<()>;
}

/// Internal users and rooms, for attendee assembly and CRM user linkage.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn user(&self, user_id: &str) -> Result<Option<User>>;
    async fn room(&self, room_id: &str) -> Result<Option<Room>>;
}
