//! SQLite-backed implementation of the ConnectionRepository port.

use async_trait::async_trait;
use bookline_core::ConnectionRepository;
use bookline_domain::{BooklineError, CalendarConnection, Result};
use chrono::{DateTime, Utc};
use rusqlite::params;
use tracing::instrument;

use super::manager::SqlitePool;
use super::timestamps::{from_secs, to_secs};
use crate::errors::InfraError;

pub struct SqliteConnectionRepository {
    pool: SqlitePool,
}

impl SqliteConnectionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store or replace the connection row for a user, typically after the
    /// initial OAuth consent exchange.
    pub fn upsert(&self, connection: &CalendarConnection) -> Result<()> {
        let conn = self.pool.get().map_err(|e| InfraError::from(e).0)?;
        conn.execute(
            "INSERT INTO calendar_connections
                 (user_id, calendar_id, access_token, refresh_token, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                 calendar_id = excluded.calendar_id,
                 access_token = excluded.access_token,
                 refresh_token = excluded.refresh_token,
                 expires_at = excluded.expires_at",
            params![
                connection.user_id,
                connection.calendar_id,
                connection.access_token,
                connection.refresh_token,
                to_secs(connection.expires_at),
            ],
        )
        .map_err(|e| InfraError::from(e).0)?;
        Ok(())
    }
}

#[async_trait]
impl ConnectionRepository for SqliteConnectionRepository {
    #[instrument(skip(self))]
    async fn get(&self, user_id: &str) -> Result<Option<CalendarConnection>> {
        let conn = self.pool.get().map_err(|e| InfraError::from(e).0)?;
        let result = conn.query_row(
            "SELECT user_id, calendar_id, access_token, refresh_token, expires_at
             FROM calendar_connections WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            },
        );
        match result {
            Ok((user_id, calendar_id, access_token, refresh_token, expires_secs)) => {
                Ok(Some(CalendarConnection {
                    user_id,
                    calendar_id,
                    access_token,
                    refresh_token,
                    expires_at: from_secs(expires_secs)?,
                }))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(InfraError::from(e).0),
        }
    }

    #[instrument(skip(self, access_token))]
    async fn update_tokens(
        &self,
        user_id: &str,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.pool.get().map_err(|e| InfraError::from(e).0)?;
        let changed = conn
            .execute(
                "UPDATE calendar_connections SET access_token = ?2, expires_at = ?3
                 WHERE user_id = ?1",
                params![user_id, access_token, to_secs(expires_at)],
            )
            .map_err(|e| InfraError::from(e).0)?;
        if changed == 0 {
            return Err(BooklineError::NotFound(format!("calendar connection for {user_id}")));
        }
        Ok(())
    }
}
