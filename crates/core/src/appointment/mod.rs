//! External appointment persistence
//!
//! The CRM's create endpoint frequently accepts a payload but stores an
//! object missing required relationships ("successful create, incomplete
//! result"). This module owns the bounded create→verify→repair→recreate
//! state machine that reconciles that behavior with the booking's need for
//! a complete appointment record.

pub mod contacts;
pub mod fields;
pub mod payload;
pub mod ports;
pub mod verify;
pub mod writer;

pub use contacts::ContactResolver;
pub use payload::CanonicalAppointment;
pub use ports::{AppointmentApi, CrmResponse};
pub use verify::{missing_fields, VerifyExpectation};
pub use writer::{AppointmentRequest, AppointmentWriter, RunContext};
