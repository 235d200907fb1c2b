//! Progress log sink port
//!
//! The sink exists to observe the booking flow, so it must never be able to
//! abort it: `append` is infallible by contract — implementations catch and
//! drop their own failures. Consumers choose pull (`poll`) or push
//! (`subscribe`) transport behind the same interface.

use async_trait::async_trait;
use bookline_domain::{ProgressLogEntry, Result};
use tokio::sync::mpsc;

/// Append-only, per-run event log keyed by `(meeting_id, run_id)`.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Append one entry. Must never fail; implementations swallow and log
    /// their own errors.
    async fn append(&self, entry: ProgressLogEntry);

    /// All entries for a run, sorted by `created_at` ascending.
    async fn poll(&self, run_id: &str) -> Result<Vec<ProgressLogEntry>>;

    /// Push transport: a receiver that yields entries for `run_id` as they
    /// are appended. Consumers stop on a terminal entry
    /// (`entry.is_terminal()`).
    async fn subscribe(&self, run_id: &str) -> mpsc::Receiver<ProgressLogEntry>;
}
