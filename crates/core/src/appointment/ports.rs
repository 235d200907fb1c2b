//! CRM appointment API port
//!
//! The writer drives the repair protocol; an adapter implements raw HTTP
//! verbs against `/v1/events` and the contact/matter sub-resources. Network
//! faults and timeouts surface as `Err`; HTTP-level failures come back as a
//! response with a non-2xx status so the writer can record them.

use async_trait::async_trait;
use bookline_domain::Result;
use serde_json::Value;

/// Status and parsed body of one CRM call.
#[derive(Debug, Clone)]
pub struct CrmResponse {
    pub status: u16,
    pub body: Value,
}

impl CrmResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Raw operations on the CRM appointment resource and its sub-resources.
#[async_trait]
pub trait AppointmentApi: Send + Sync {
    async fn create_event(&self, body: &Value) -> Result<CrmResponse>;
    async fn get_event(&self, id: i64) -> Result<CrmResponse>;
    async fn patch_event(&self, id: i64, body: &Value) -> Result<CrmResponse>;
    async fn put_event(&self, id: i64, body: &Value) -> Result<CrmResponse>;
    async fn delete_event(&self, id: i64) -> Result<CrmResponse>;

    /// Exact-match contact search by email.
    async fn search_contacts(&self, email: &str) -> Result<CrmResponse>;
    async fn create_contact(&self, body: &Value) -> Result<CrmResponse>;

    async fn search_matters(&self, contact_id: i64) -> Result<CrmResponse>;
    async fn create_matter(&self, body: &Value) -> Result<CrmResponse>;
}
