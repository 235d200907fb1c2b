//! Idempotent contact and matter resolution
//!
//! Both sub-resources follow search-then-create semantics: an exact match is
//! reused, a miss creates. A caller that already holds a persisted external
//! ID skips the sub-flow entirely — no network call is issued.

use std::sync::Arc;

use bookline_domain::{BooklineError, IntegrationSystem, Result};
use serde_json::json;
use tracing::debug;

use super::fields::{pick_i64, pick_str, record_array, record_object};
use super::ports::{AppointmentApi, CrmResponse};

/// Resolves CRM contacts and matters ahead of appointment creation.
pub struct ContactResolver {
    api: Arc<dyn AppointmentApi>,
}

impl ContactResolver {
    pub fn new(api: Arc<dyn AppointmentApi>) -> Self {
        Self { api }
    }

    /// Find or create the CRM contact for a client email.
    ///
    /// `existing` short-circuits: a persisted contact ID means the sub-flow
    /// already ran for this meeting.
    pub async fn resolve_contact(
        &self,
        existing: Option<i64>,
        email: &str,
        name: &str,
    ) -> Result<i64> {
        if let Some(id) = existing {
            debug!(contact_id = id, "contact already persisted; skipping resolution");
            return Ok(id);
        }

        let search = self.api.search_contacts(email).await?;
        if search.is_success() {
            if let Some(items) = record_array(&search.body, &["contacts"]) {
                for item in items {
                    let matches = pick_str(item, &["email"])
                        .map(|found| found.eq_ignore_ascii_case(email))
                        .unwrap_or(false);
                    if matches {
                        if let Some(id) = pick_i64(item, &["id", "contact_id"]) {
                            debug!(contact_id = id, "reusing existing CRM contact");
                            return Ok(id);
                        }
                    }
                }
            }
        }

        let created =
            self.api.create_contact(&json!({ "name": name, "email": email })).await?;
        id_from_create(&created, IntegrationSystem::Crm)
    }

    /// Find or create the matter attached to a contact.
    pub async fn resolve_matter(
        &self,
        existing: Option<i64>,
        contact_id: i64,
        description: &str,
    ) -> Result<i64> {
        if let Some(id) = existing {
            debug!(matter_id = id, "matter already persisted; skipping resolution");
            return Ok(id);
        }

        let search = self.api.search_matters(contact_id).await?;
        if search.is_success() {
            if let Some(items) = record_array(&search.body, &["matters"]) {
                if let Some(id) = items.first().and_then(|item| pick_i64(item, &["id"])) {
                    debug!(matter_id = id, "reusing existing CRM matter");
                    return Ok(id);
                }
            }
        }

        let created = self
            .api
            .create_matter(&json!({ "contact_id": contact_id, "description": description }))
            .await?;
        id_from_create(&created, IntegrationSystem::Crm)
    }
}

fn id_from_create(resp: &CrmResponse, system: IntegrationSystem) -> Result<i64> {
    if !resp.is_success() {
        return Err(BooklineError::integration(
            system,
            Some(resp.status),
            resp.body.to_string(),
        ));
    }
    pick_i64(record_object(&resp.body), &["id"]).ok_or_else(|| {
        BooklineError::integration(system, Some(resp.status), "create response carried no id")
    })
}
