//! SQLite-backed implementation of the BookingRequestRepository port.

use async_trait::async_trait;
use bookline_core::BookingRequestRepository;
use bookline_domain::{BookingRequest, BookingRequestStatus, BooklineError, Result};
use rusqlite::{params, Row};
use tracing::instrument;

use super::manager::SqlitePool;
use super::timestamps::{from_secs, to_secs};
use crate::errors::InfraError;

const REQUEST_COLUMNS: &str = "id, meeting_id, public_token, expires_at, status";

pub struct SqliteBookingRequestRepository {
    pool: SqlitePool,
}

impl SqliteBookingRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn query_one(&self, sql: &str, param: &str) -> Result<Option<BookingRequest>> {
        let conn = self.pool.get().map_err(|e| InfraError::from(e).0)?;
        let result = conn.query_row(sql, params![param], request_from_row);
        match result {
            Ok(request) => Ok(Some(request?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(InfraError::from(e).0),
        }
    }
}

#[async_trait]
impl BookingRequestRepository for SqliteBookingRequestRepository {
    #[instrument(skip(self, request), fields(request_id = %request.id))]
    async fn insert(&self, request: &BookingRequest) -> Result<()> {
        let conn = self.pool.get().map_err(|e| InfraError::from(e).0)?;
        conn.execute(
            "INSERT INTO booking_requests (id, meeting_id, public_token, expires_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                request.id,
                request.meeting_id,
                request.public_token,
                to_secs(request.expires_at),
                request.status.as_str(),
            ],
        )
        .map_err(|e| InfraError::from(e).0)?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn find_by_token(&self, token: &str) -> Result<Option<BookingRequest>> {
        let sql =
            format!("SELECT {REQUEST_COLUMNS} FROM booking_requests WHERE public_token = ?1");
        self.query_one(&sql, token)
    }

    #[instrument(skip(self))]
    async fn find_open_for_meeting(&self, meeting_id: &str) -> Result<Option<BookingRequest>> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM booking_requests
             WHERE meeting_id = ?1 AND status = 'open' LIMIT 1"
        );
        self.query_one(&sql, meeting_id)
    }

    #[instrument(skip(self))]
    async fn set_status(&self, id: &str, status: BookingRequestStatus) -> Result<()> {
        let conn = self.pool.get().map_err(|e| InfraError::from(e).0)?;
        let changed = conn
            .execute(
                "UPDATE booking_requests SET status = ?2 WHERE id = ?1",
                params![id, status.as_str()],
            )
            .map_err(|e| InfraError::from(e).0)?;
        if changed == 0 {
            return Err(BooklineError::NotFound(format!("booking request {id}")));
        }
        Ok(())
    }
}

fn request_from_row(row: &Row<'_>) -> rusqlite::Result<Result<BookingRequest>> {
    let id: String = row.get(0)?;
    let meeting_id: String = row.get(1)?;
    let public_token: String = row.get(2)?;
    let expires_secs: i64 = row.get(3)?;
    let status: String = row.get(4)?;

    Ok((|| {
        let status = BookingRequestStatus::parse(&status).ok_or_else(|| {
            BooklineError::Database(format!("unknown booking request status: {status}"))
        })?;
        Ok(BookingRequest {
            id,
            meeting_id,
            public_token,
            expires_at: from_secs(expires_secs)?,
            status,
        })
    })())
}
