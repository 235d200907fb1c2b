//! Durable progress sink: append/poll ordering, live subscription, and the
//! bounded terminal wait.

mod support;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use bookline_core::ProgressSink;
use bookline_domain::constants::PROGRESS_STEP_DONE;
use bookline_domain::{LogLevel, ProgressLogEntry};
use bookline_infra::SqliteProgressSink;
use chrono::Duration;
use tokio_util::sync::CancellationToken;

use support::{fixed_now, test_db};

fn entry(run_id: &str, step: &str, level: LogLevel, offset_ms: i64) -> ProgressLogEntry {
    ProgressLogEntry {
        meeting_id: "m-1".into(),
        run_id: run_id.into(),
        step: step.into(),
        level,
        message: format!("{step} message"),
        details: None,
        created_at: fixed_now() + Duration::milliseconds(offset_ms),
    }
}

#[tokio::test]
async fn poll_returns_entries_in_creation_order() {
    let db = test_db();
    let sink = SqliteProgressSink::new(db.manager.pool());

    sink.append(entry("r-1", "start", LogLevel::Info, 0)).await;
    sink.append(entry("r-1", "crm:create", LogLevel::Info, 10)).await;
    sink.append(entry("r-2", "start", LogLevel::Info, 5)).await;
    sink.append(entry("r-1", PROGRESS_STEP_DONE, LogLevel::Success, 20)).await;

    let entries = sink.poll("r-1").await.expect("poll succeeds");
    let steps: Vec<&str> = entries.iter().map(|e| e.step.as_str()).collect();
    assert_eq!(steps, vec!["start", "crm:create", PROGRESS_STEP_DONE]);
}

#[tokio::test]
async fn subscriber_receives_only_its_run() {
    let db = test_db();
    let sink = SqliteProgressSink::new(db.manager.pool());

    let mut rx = sink.subscribe("r-1").await;
    sink.append(entry("r-2", "start", LogLevel::Info, 0)).await;
    sink.append(entry("r-1", "start", LogLevel::Info, 1)).await;

    let received = rx.recv().await.expect("entry delivered");
    assert_eq!(received.run_id, "r-1");
    assert_eq!(received.step, "start");
}

#[tokio::test]
async fn await_terminal_finishes_on_done_entry() {
    let db = test_db();
    let sink = Arc::new(SqliteProgressSink::new(db.manager.pool()));

    let waiter = {
        let sink = sink.clone();
        tokio::spawn(async move {
            sink.await_terminal("r-1", StdDuration::from_secs(5), &CancellationToken::new())
                .await
        })
    };

    sink.append(entry("r-1", "start", LogLevel::Info, 0)).await;
    sink.append(entry("r-1", PROGRESS_STEP_DONE, LogLevel::Success, 10)).await;

    let entries = waiter.await.expect("task joins").expect("wait succeeds");
    assert!(entries.iter().any(|e| e.step == PROGRESS_STEP_DONE));
}

#[tokio::test]
async fn await_terminal_treats_error_level_as_terminal() {
    let db = test_db();
    let sink = SqliteProgressSink::new(db.manager.pool());

    sink.append(entry("r-1", "crm", LogLevel::Error, 0)).await;

    let entries = sink
        .await_terminal("r-1", StdDuration::from_secs(1), &CancellationToken::new())
        .await
        .expect("already terminal");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, LogLevel::Error);
}

#[tokio::test]
async fn await_terminal_times_out_without_terminal_entry() {
    let db = test_db();
    let sink = SqliteProgressSink::new(db.manager.pool());

    sink.append(entry("r-1", "start", LogLevel::Info, 0)).await;

    let err = sink
        .await_terminal("r-1", StdDuration::from_millis(50), &CancellationToken::new())
        .await
        .expect_err("no terminal entry arrives");
    assert!(matches!(err, bookline_domain::BooklineError::Timeout(_)));
}

#[tokio::test]
async fn cancellation_ends_the_wait_with_entries_so_far() {
    let db = test_db();
    let sink = SqliteProgressSink::new(db.manager.pool());

    sink.append(entry("r-1", "start", LogLevel::Info, 0)).await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let entries = sink
        .await_terminal("r-1", StdDuration::from_secs(5), &cancel)
        .await
        .expect("cancellation is not an error");
    assert_eq!(entries.len(), 1);
}
