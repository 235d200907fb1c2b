//! In-memory progress sink
//!
//! Backs unit tests and single-process deployments. The durable SQLite sink
//! lives in the infra crate; both share the subscription fan-out shape.

use std::sync::Mutex;

use async_trait::async_trait;
use bookline_domain::{ProgressLogEntry, Result};
use tokio::sync::mpsc;

use super::ports::ProgressSink;

const SUBSCRIBER_BUFFER: usize = 64;

/// Progress sink holding entries in memory.
#[derive(Default)]
pub struct MemoryProgressSink {
    entries: Mutex<Vec<ProgressLogEntry>>,
    subscribers: Mutex<Vec<(String, mpsc::Sender<ProgressLogEntry>)>>,
}

impl MemoryProgressSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry appended so far, across all runs. Test helper.
    pub fn all_entries(&self) -> Vec<ProgressLogEntry> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ProgressSink for MemoryProgressSink {
    async fn append(&self, entry: ProgressLogEntry) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).push(entry.clone());

        // Fan out to live subscribers of this run; drop closed ones.
        let targets: Vec<mpsc::Sender<ProgressLogEntry>> = {
            let mut subs = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
            subs.retain(|(_, tx)| !tx.is_closed());
            subs.iter()
                .filter(|(run_id, _)| *run_id == entry.run_id)
                .map(|(_, tx)| tx.clone())
                .collect()
        };
        for tx in targets {
            // A slow or gone subscriber must not block the booking flow.
            let _ = tx.try_send(entry.clone());
        }
    }

    async fn poll(&self, run_id: &str) -> Result<Vec<ProgressLogEntry>> {
        let mut entries: Vec<ProgressLogEntry> = self
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|e| e.run_id == run_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }

    async fn subscribe(&self, run_id: &str) -> mpsc::Receiver<ProgressLogEntry> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((run_id.to_string(), tx));
        rx
    }
}
