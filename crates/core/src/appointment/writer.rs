//! Appointment writer state machine
//!
//! Bounded protocol against the CRM's eventually-consistent write API:
//!
//! ```text
//! Draft → Created(unverified) → { Persisted | Repaired | Failed }
//! ```
//!
//! Create, read back, and repair until the stored record carries every
//! required field — or every variant is exhausted. The writer never returns
//! an error: total failure, created-but-incomplete, and verified success
//! are all expressed in the [`AppointmentOutcome`], and every transition is
//! mirrored into the progress log before and after the network call.

use std::future::Future;
use std::sync::Arc;

use bookline_domain::{
    AppointmentAttempt, AppointmentOutcome, BooklineError, Envelope, LogLevel, ProgressLogEntry,
    RequiredField, TimeFormat,
};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::fields::{pick_i64, record_object};
use super::payload::CanonicalAppointment;
use super::ports::{AppointmentApi, CrmResponse};
use super::verify::{missing_fields, VerifyExpectation};
use crate::progress::ports::ProgressSink;
use crate::time::clock::Clock;

/// Identifies one confirmation run for progress logging.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub meeting_id: String,
    pub run_id: String,
}

/// One writer invocation: the canonical appointment plus what a complete
/// record must contain.
#[derive(Debug, Clone)]
pub struct AppointmentRequest {
    pub appointment: CanonicalAppointment,
    pub expect: VerifyExpectation,
}

/// Named protocol states, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Draft,
    Created,
    Persisted,
    Repaired,
    Failed,
}

impl WriterState {
    fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Created => "created",
            Self::Persisted => "persisted",
            Self::Repaired => "repaired",
            Self::Failed => "failed",
        }
    }
}

/// Create→verify→repair writer over an [`AppointmentApi`] port.
pub struct AppointmentWriter {
    api: Arc<dyn AppointmentApi>,
    progress: Arc<dyn ProgressSink>,
    clock: Arc<dyn Clock>,
}

impl AppointmentWriter {
    pub fn new(
        api: Arc<dyn AppointmentApi>,
        progress: Arc<dyn ProgressSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { api, progress, clock }
    }

    /// Run the full protocol. Infallible by design: all failure modes are
    /// encoded in the outcome so the booking flow can degrade to warnings.
    pub async fn write(&self, run: &RunContext, req: &AppointmentRequest) -> AppointmentOutcome {
        let mut attempts: Vec<AppointmentAttempt> = Vec::new();
        self.transition(run, WriterState::Draft, WriterState::Created).await;

        // ---- Create (bare envelope, seconds precision) ----
        let payload = match req.appointment.enveloped(TimeFormat::HourMinuteSecond, Envelope::Bare)
        {
            Ok(p) => p,
            Err(err) => {
                self.log(run, "crm:payload", LogLevel::Warn, err.to_string(), None).await;
                return AppointmentOutcome::failed(attempts);
            }
        };
        let Some(resp) =
            self.mutate(run, "crm:create", &mut attempts, self.api.create_event(&payload)).await
        else {
            self.transition(run, WriterState::Created, WriterState::Failed).await;
            return AppointmentOutcome::failed(attempts);
        };
        if !resp.is_success() {
            self.transition(run, WriterState::Created, WriterState::Failed).await;
            return AppointmentOutcome::failed(attempts);
        }
        let Some(mut created_id) = pick_i64(record_object(&resp.body), &["id", "event_id"]) else {
            self.log(
                run,
                "crm:create",
                LogLevel::Warn,
                "create succeeded but response carried no id".into(),
                None,
            )
            .await;
            self.transition(run, WriterState::Created, WriterState::Failed).await;
            return AppointmentOutcome::failed(attempts);
        };

        // ---- Verify ----
        let (missing, mut readback) = self.verify(run, created_id, &req.expect).await;
        if missing.is_empty() {
            self.transition(run, WriterState::Created, WriterState::Persisted).await;
            return AppointmentOutcome {
                persisted: true,
                created_id: Some(created_id),
                readback,
                attempts,
                used_time_format: TimeFormat::HourMinuteSecond,
            };
        }

        // ---- Repair: PATCH, then PUT, then the HH:mm timing fallback ----
        type RepairStep = (&'static str, TimeFormat, bool);
        const REPAIRS: [RepairStep; 3] = [
            ("crm:repair:patch", TimeFormat::HourMinuteSecond, false),
            ("crm:repair:put", TimeFormat::HourMinuteSecond, true),
            ("crm:repair:patch-hm", TimeFormat::HourMinute, false),
        ];
        for (step, format, full_replace) in REPAIRS {
            let body = match req.appointment.payload(format) {
                Ok(p) => p,
                Err(err) => {
                    self.log(run, step, LogLevel::Warn, err.to_string(), None).await;
                    continue;
                }
            };
            let call = if full_replace {
                self.api.put_event(created_id, &body)
            } else {
                self.api.patch_event(created_id, &body)
            };
            if self.mutate(run, step, &mut attempts, call).await.is_none() {
                continue;
            }
            let (missing, after) = self.verify(run, created_id, &req.expect).await;
            if after.is_some() {
                readback = after;
            }
            if missing.is_empty() {
                self.transition(run, WriterState::Created, WriterState::Repaired).await;
                return AppointmentOutcome {
                    persisted: true,
                    created_id: Some(created_id),
                    readback,
                    attempts,
                    used_time_format: format,
                };
            }
        }

        // ---- Recreate with alternate envelopes ----
        for envelope in [Envelope::Event, Envelope::Data] {
            let step = match envelope {
                Envelope::Event => "crm:recreate:event",
                Envelope::Data => "crm:recreate:data",
                Envelope::Bare => unreachable!("bare envelope is the initial create"),
            };
            let _ = self
                .mutate(
                    run,
                    "crm:recreate:delete",
                    &mut attempts,
                    self.api.delete_event(created_id),
                )
                .await;

            let body = match req.appointment.enveloped(TimeFormat::HourMinuteSecond, envelope) {
                Ok(p) => p,
                Err(err) => {
                    self.log(run, step, LogLevel::Warn, err.to_string(), None).await;
                    continue;
                }
            };
            let Some(resp) =
                self.mutate(run, step, &mut attempts, self.api.create_event(&body)).await
            else {
                continue;
            };
            if !resp.is_success() {
                continue;
            }
            if let Some(new_id) = pick_i64(record_object(&resp.body), &["id", "event_id"]) {
                created_id = new_id;
            }
            let (missing, after) = self.verify(run, created_id, &req.expect).await;
            if after.is_some() {
                readback = after;
            }
            if missing.is_empty() {
                self.transition(run, WriterState::Created, WriterState::Repaired).await;
                return AppointmentOutcome {
                    persisted: true,
                    created_id: Some(created_id),
                    readback,
                    attempts,
                    used_time_format: TimeFormat::HourMinuteSecond,
                };
            }
        }

        // ---- Terminal: created but incomplete ----
        // Distinct from total failure: an ID exists, so the caller stores it
        // for manual follow-up.
        self.transition(run, WriterState::Created, WriterState::Failed).await;
        warn!(
            meeting_id = %run.meeting_id,
            created_id,
            "appointment created but incomplete after all repair variants"
        );
        AppointmentOutcome {
            persisted: false,
            created_id: Some(created_id),
            readback,
            attempts,
            used_time_format: TimeFormat::HourMinuteSecond,
        }
    }

    /// Issue one mutating call, recording it as an attempt and logging
    /// before/after. Returns `None` on a transport-level failure.
    async fn mutate<F>(
        &self,
        run: &RunContext,
        step: &str,
        attempts: &mut Vec<AppointmentAttempt>,
        call: F,
    ) -> Option<CrmResponse>
    where
        F: Future<Output = bookline_domain::Result<CrmResponse>>,
    {
        self.log(run, step, LogLevel::Info, "issuing request".into(), None).await;
        match call.await {
            Ok(resp) => {
                let ok = resp.is_success();
                attempts.push(AppointmentAttempt {
                    step: step.to_string(),
                    http_status: Some(resp.status),
                    ok,
                    note: if ok { "ok".to_string() } else { format!("http {}", resp.status) },
                });
                let level = if ok { LogLevel::Info } else { LogLevel::Warn };
                self.log(run, step, level, format!("status {}", resp.status), None).await;
                Some(resp)
            }
            Err(err) => {
                attempts.push(AppointmentAttempt {
                    step: step.to_string(),
                    http_status: error_status(&err),
                    ok: false,
                    note: err.to_string(),
                });
                self.log(run, step, LogLevel::Warn, err.to_string(), None).await;
                None
            }
        }
    }

    /// Read the record back and compute missing fields. An unreadable
    /// record counts as missing everything the expectation checks.
    async fn verify(
        &self,
        run: &RunContext,
        id: i64,
        expect: &VerifyExpectation,
    ) -> (Vec<RequiredField>, Option<Value>) {
        self.log(run, "crm:verify", LogLevel::Info, format!("reading back event {id}"), None)
            .await;
        match self.api.get_event(id).await {
            Ok(resp) if resp.is_success() => {
                let missing = missing_fields(&resp.body, expect);
                if missing.is_empty() {
                    self.log(
                        run,
                        "crm:verify",
                        LogLevel::Success,
                        "all required fields persisted".into(),
                        None,
                    )
                    .await;
                } else {
                    let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
                    self.log(
                        run,
                        "crm:verify",
                        LogLevel::Warn,
                        format!("read-back missing fields: {}", names.join(", ")),
                        Some(json!({ "missing": names })),
                    )
                    .await;
                }
                (missing, Some(resp.body))
            }
            Ok(resp) => {
                self.log(
                    run,
                    "crm:verify",
                    LogLevel::Warn,
                    format!("read-back failed with status {}", resp.status),
                    None,
                )
                .await;
                (expect.all_fields(), None)
            }
            Err(err) => {
                self.log(run, "crm:verify", LogLevel::Warn, err.to_string(), None).await;
                (expect.all_fields(), None)
            }
        }
    }

    async fn transition(&self, run: &RunContext, from: WriterState, to: WriterState) {
        debug!(meeting_id = %run.meeting_id, from = from.as_str(), to = to.as_str(), "writer transition");
        self.log(
            run,
            "crm:state",
            LogLevel::Info,
            format!("{} -> {}", from.as_str(), to.as_str()),
            None,
        )
        .await;
    }

    async fn log(
        &self,
        run: &RunContext,
        step: &str,
        level: LogLevel,
        message: String,
        details: Option<Value>,
    ) {
        self.progress
            .append(ProgressLogEntry {
                meeting_id: run.meeting_id.clone(),
                run_id: run.run_id.clone(),
                step: step.to_string(),
                level,
                message,
                details,
                created_at: self.clock.now(),
            })
            .await;
    }
}

fn error_status(err: &BooklineError) -> Option<u16> {
    match err {
        BooklineError::Integration { status, .. } => *status,
        _ => None,
    }
}
