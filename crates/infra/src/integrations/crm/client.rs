//! HTTP adapter for the CRM appointment API.
//!
//! Implements the raw verbs the appointment writer drives. Transport faults
//! and budget expiry surface as `Err`; any HTTP response — success or not —
//! comes back as a [`CrmResponse`] so the writer can decide what to do with
//! the status. Bodies that are not JSON are wrapped so the caller still
//! sees an excerpt.

use std::time::Duration;

use async_trait::async_trait;
use bookline_core::{AppointmentApi, CrmResponse};
use bookline_domain::constants::CRM_CALL_TIMEOUT_SECS;
use bookline_domain::{truncate_excerpt, CrmConfig, Result};
use reqwest::{Method, Response};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::http::HttpClient;

pub struct CrmClient {
    http: HttpClient,
    base_url: String,
    access_token: String,
}

impl CrmClient {
    pub fn new(http: HttpClient, settings: &CrmConfig) -> Self {
        Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            access_token: settings.access_token.clone(),
        }
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&Value>,
    ) -> Result<CrmResponse> {
        let url = format!("{}{path}", self.base_url);
        debug!(%method, %url, "crm request");

        let mut request = self
            .http
            .request(method, &url)
            .timeout(Duration::from_secs(CRM_CALL_TIMEOUT_SECS))
            .bearer_auth(&self.access_token);
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.http.send(request).await?;
        Ok(into_crm_response(response).await)
    }
}

async fn into_crm_response(response: Response) -> CrmResponse {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let body = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => json!({ "raw": truncate_excerpt(&text) }),
    };
    CrmResponse { status, body }
}

#[async_trait]
impl AppointmentApi for CrmClient {
    #[instrument(skip(self, body))]
    async fn create_event(&self, body: &Value) -> Result<CrmResponse> {
        self.call(Method::POST, "/v1/events", None, Some(body)).await
    }

    #[instrument(skip(self))]
    async fn get_event(&self, id: i64) -> Result<CrmResponse> {
        self.call(Method::GET, &format!("/v1/events/{id}"), None, None).await
    }

    #[instrument(skip(self, body))]
    async fn patch_event(&self, id: i64, body: &Value) -> Result<CrmResponse> {
        self.call(Method::PATCH, &format!("/v1/events/{id}"), None, Some(body)).await
    }

    #[instrument(skip(self, body))]
    async fn put_event(&self, id: i64, body: &Value) -> Result<CrmResponse> {
        self.call(Method::PUT, &format!("/v1/events/{id}"), None, Some(body)).await
    }

    #[instrument(skip(self))]
    async fn delete_event(&self, id: i64) -> Result<CrmResponse> {
        self.call(Method::DELETE, &format!("/v1/events/{id}"), None, None).await
    }

    #[instrument(skip(self, email))]
    async fn search_contacts(&self, email: &str) -> Result<CrmResponse> {
        self.call(Method::GET, "/v1/contacts", Some(&[("email", email.to_string())]), None).await
    }

    #[instrument(skip(self, body))]
    async fn create_contact(&self, body: &Value) -> Result<CrmResponse> {
        self.call(Method::POST, "/v1/contacts", None, Some(body)).await
    }

    #[instrument(skip(self))]
    async fn search_matters(&self, contact_id: i64) -> Result<CrmResponse> {
        self.call(
            Method::GET,
            "/v1/matters",
            Some(&[("contact_id", contact_id.to_string())]),
            None,
        )
        .await
    }

    #[instrument(skip(self, body))]
    async fn create_matter(&self, body: &Value) -> Result<CrmResponse> {
        self.call(Method::POST, "/v1/matters", None, Some(body)).await
    }
}
