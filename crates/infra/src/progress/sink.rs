//! SQLite-backed progress sink
//!
//! The append side must never fail the booking flow: write errors are
//! logged and swallowed, and live subscribers still receive the entry.
//! Polling reads the persisted trail back in creation order; the
//! `await_terminal` helper is how a caller waits (boundedly) for a run to
//! finish.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bookline_core::ProgressSink;
use bookline_domain::{BooklineError, LogLevel, ProgressLogEntry, Result};
use rusqlite::params;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, instrument};

use crate::database::manager::SqlitePool;
use crate::database::timestamps::{from_millis, to_millis};
use crate::errors::InfraError;

const SUBSCRIBER_BUFFER: usize = 64;

pub struct SqliteProgressSink {
    pool: SqlitePool,
    subscribers: Mutex<Vec<(String, mpsc::Sender<ProgressLogEntry>)>>,
}

impl SqliteProgressSink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, subscribers: Mutex::new(Vec::new()) }
    }

    fn persist(&self, entry: &ProgressLogEntry) -> Result<()> {
        let conn = self.pool.get().map_err(|e| InfraError::from(e).0)?;
        let details = entry
            .details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| InfraError::from(e).0)?;
        conn.execute(
            "INSERT INTO progress_log
                 (meeting_id, run_id, step, level, message, details, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.meeting_id,
                entry.run_id,
                entry.step,
                entry.level.as_str(),
                entry.message,
                details,
                to_millis(entry.created_at),
            ],
        )
        .map_err(|e| InfraError::from(e).0)?;
        Ok(())
    }

    fn fan_out(&self, entry: &ProgressLogEntry) {
        let mut subscribers = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        subscribers.retain(|(run_id, tx)| {
            if run_id != &entry.run_id {
                return !tx.is_closed();
            }
            // A lagging subscriber loses entries rather than stalling the
            // booking flow.
            match tx.try_send(entry.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => true,
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }

    /// Wait until the run emits a terminal entry (a `done` step or an
    /// error-level entry), up to `timeout`. Returns everything observed so
    /// far; cancellation ends the wait early without an error.
    pub async fn await_terminal(
        &self,
        run_id: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProgressLogEntry>> {
        // Subscribe before polling so no entry can slip between the two.
        let mut rx = self.subscribe(run_id).await;
        let mut seen = self.poll(run_id).await?;
        if seen.iter().any(ProgressLogEntry::is_terminal) {
            return Ok(seen);
        }

        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => {
                    return Err(BooklineError::Timeout(format!(
                        "no terminal progress entry for run {run_id} within {}s",
                        timeout.as_secs()
                    )));
                }
                _ = cancel.cancelled() => return Ok(seen),
                maybe = rx.recv() => match maybe {
                    Some(entry) => {
                        let terminal = entry.is_terminal();
                        seen.push(entry);
                        if terminal {
                            return Ok(seen);
                        }
                    }
                    None => return Ok(seen),
                }
            }
        }
    }
}

#[async_trait]
impl ProgressSink for SqliteProgressSink {
    #[instrument(skip(self, entry), fields(run_id = %entry.run_id, step = %entry.step))]
    async fn append(&self, entry: ProgressLogEntry) {
        if let Err(err) = self.persist(&entry) {
            error!(error = %err, run_id = %entry.run_id, "failed to persist progress entry");
        }
        self.fan_out(&entry);
    }

    async fn poll(&self, run_id: &str) -> Result<Vec<ProgressLogEntry>> {
        let conn = self.pool.get().map_err(|e| InfraError::from(e).0)?;
        let mut stmt = conn
            .prepare(
                "SELECT meeting_id, run_id, step, level, message, details, created_at
                 FROM progress_log WHERE run_id = ?1 ORDER BY created_at, id",
            )
            .map_err(|e| InfraError::from(e).0)?;

        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            })
            .map_err(|e| InfraError::from(e).0)?;

        let mut entries = Vec::new();
        for row in rows {
            let (meeting_id, run_id, step, level, message, details, created_millis) =
                row.map_err(|e| InfraError::from(e).0)?;
            let level = LogLevel::parse(&level).ok_or_else(|| {
                BooklineError::Database(format!("unknown progress level: {level}"))
            })?;
            let details = details
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .map_err(|e| BooklineError::Database(format!("invalid progress details: {e}")))?;
            entries.push(ProgressLogEntry {
                meeting_id,
                run_id,
                step,
                level,
                message,
                details,
                created_at: from_millis(created_millis)?,
            });
        }
        Ok(entries)
    }

    async fn subscribe(&self, run_id: &str) -> mpsc::Receiver<ProgressLogEntry> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        let mut subscribers = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        subscribers.push((run_id.to_string(), tx));
        rx
    }
}
