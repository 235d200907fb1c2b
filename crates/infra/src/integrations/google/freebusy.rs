//! FreeBusyProvider adapter for the Google Calendar `freeBusy` endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bookline_core::FreeBusyProvider;
use bookline_domain::constants::FREEBUSY_TIMEOUT_SECS;
use bookline_domain::{BooklineError, BusyInterval, IntegrationSystem, Result};
use chrono::{DateTime, Utc};
use reqwest::Method;
use tracing::{instrument, warn};

use super::auth::GoogleTokenProvider;
use super::types::{FreeBusyItem, FreeBusyRequest, FreeBusyResponse};
use crate::http::HttpClient;

pub struct GoogleFreeBusy {
    http: HttpClient,
    auth: Arc<GoogleTokenProvider>,
    api_base_url: String,
    /// User whose connection authorizes the query. The workspace-wide
    /// free/busy read runs under one linked account.
    connection_user_id: String,
}

impl GoogleFreeBusy {
    pub fn new(
        http: HttpClient,
        auth: Arc<GoogleTokenProvider>,
        api_base_url: impl Into<String>,
        connection_user_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            auth,
            api_base_url: api_base_url.into(),
            connection_user_id: connection_user_id.into(),
        }
    }
}

#[async_trait]
impl FreeBusyProvider for GoogleFreeBusy {
    #[instrument(skip(self, calendar_ids), fields(calendars = calendar_ids.len()))]
    async fn free_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        calendar_ids: &[String],
    ) -> Result<Vec<BusyInterval>> {
        let token = self.auth.access_token(&self.connection_user_id).await?;
        let body = FreeBusyRequest {
            time_min,
            time_max,
            items: calendar_ids.iter().map(|id| FreeBusyItem { id: id.clone() }).collect(),
        };

        let request = self
            .http
            .request(Method::POST, format!("{}/freeBusy", self.api_base_url))
            .timeout(Duration::from_secs(FREEBUSY_TIMEOUT_SECS))
            .bearer_auth(&token)
            .json(&body);
        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BooklineError::integration(
                IntegrationSystem::Calendar,
                Some(status.as_u16()),
                bookline_domain::truncate_excerpt(&text),
            ));
        }

        let parsed: FreeBusyResponse = response
            .json()
            .await
            .map_err(|e| {
                BooklineError::integration(
                    IntegrationSystem::Calendar,
                    Some(status.as_u16()),
                    format!("invalid freeBusy response: {e}"),
                )
            })?;

        let mut intervals = Vec::new();
        for (calendar_id, calendar) in parsed.calendars {
            for err in &calendar.errors {
                warn!(calendar_id, reason = %err.reason, "freeBusy calendar error");
            }
            intervals.extend(
                calendar.busy.iter().map(|p| BusyInterval { start: p.start, end: p.end }),
            );
        }
        Ok(intervals)
    }
}
