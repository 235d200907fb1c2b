//! SQLite-backed implementation of the Directory port (users and rooms).

use async_trait::async_trait;
use bookline_core::Directory;
use bookline_domain::{Result, Room, User};
use rusqlite::params;
use tracing::instrument;

use super::manager::SqlitePool;
use crate::errors::InfraError;

pub struct SqliteDirectory {
    pool: SqlitePool,
}

impl SqliteDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn insert_user(&self, user: &User) -> Result<()> {
        let conn = self.pool.get().map_err(|e| InfraError::from(e).0)?;
        conn.execute(
            "INSERT INTO users (id, email, display_name, crm_user_id, crm_timezone)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user.id, user.email, user.display_name, user.crm_user_id, user.crm_timezone],
        )
        .map_err(|e| InfraError::from(e).0)?;
        Ok(())
    }

    pub fn insert_room(&self, room: &Room) -> Result<()> {
        let conn = self.pool.get().map_err(|e| InfraError::from(e).0)?;
        conn.execute(
            "INSERT INTO rooms (id, name, resource_address) VALUES (?1, ?2, ?3)",
            params![room.id, room.name, room.resource_address],
        )
        .map_err(|e| InfraError::from(e).0)?;
        Ok(())
    }
}

#[async_trait]
impl Directory for SqliteDirectory {
    #[instrument(skip(self))]
    async fn user(&self, user_id: &str) -> Result<Option<User>> {
        let conn = self.pool.get().map_err(|e| InfraError::from(e).0)?;
        let result = conn.query_row(
            "SELECT id, email, display_name, crm_user_id, crm_timezone
             FROM users WHERE id = ?1",
            params![user_id],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    display_name: row.get(2)?,
                    crm_user_id: row.get(3)?,
                    crm_timezone: row.get(4)?,
                })
            },
        );
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(InfraError::from(e).0),
        }
    }

    #[instrument(skip(self))]
    async fn room(&self, room_id: &str) -> Result<Option<Room>> {
        let conn = self.pool.get().map_err(|e| InfraError::from(e).0)?;
        let result = conn.query_row(
            "SELECT id, name, resource_address FROM rooms WHERE id = ?1",
            params![room_id],
            |row| {
                Ok(Room {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    resource_address: row.get(2)?,
                })
            },
        );
        match result {
            Ok(room) => Ok(Some(room)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(InfraError::from(e).0),
        }
    }
}
