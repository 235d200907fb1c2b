//! CalendarEvents adapter for the Google Calendar events endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bookline_core::{CalendarEvents, CreatedEvent, EventSpec};
use bookline_domain::constants::CALENDAR_WRITE_TIMEOUT_SECS;
use bookline_domain::{BooklineError, IntegrationSystem, Result};
use reqwest::Method;
use tracing::{info, instrument};

use super::auth::GoogleTokenProvider;
use super::types::{CreatedEventResponse, EventDateTime, EventResource, WireAttendee};
use crate::http::HttpClient;

pub struct GoogleCalendarEvents {
    http: HttpClient,
    auth: Arc<GoogleTokenProvider>,
    api_base_url: String,
}

impl GoogleCalendarEvents {
    pub fn new(
        http: HttpClient,
        auth: Arc<GoogleTokenProvider>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self { http, auth, api_base_url: api_base_url.into() }
    }
}

#[async_trait]
impl CalendarEvents for GoogleCalendarEvents {
    #[instrument(skip(self, spec), fields(calendar_id = %spec.calendar_id))]
    async fn create_event(&self, spec: &EventSpec) -> Result<CreatedEvent> {
        // The token belongs to the host; the event lands on their calendar.
        let token = self.auth.access_token(&spec.host_user_id).await?;

        let body = EventResource {
            summary: spec.summary.clone(),
            description: spec.description.clone(),
            start: EventDateTime { date_time: spec.starts_at, time_zone: spec.timezone.clone() },
            end: EventDateTime { date_time: spec.ends_at, time_zone: spec.timezone.clone() },
            attendees: spec
                .attendees
                .iter()
                .map(|a| WireAttendee { email: a.email.clone(), resource: a.resource })
                .collect(),
        };

        let send_updates = if spec.send_updates { "all" } else { "none" };
        let request = self
            .http
            .request(
                Method::POST,
                format!("{}/calendars/{}/events", self.api_base_url, spec.calendar_id),
            )
            .query(&[("sendUpdates", send_updates)])
            .timeout(Duration::from_secs(CALENDAR_WRITE_TIMEOUT_SECS))
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

        let created: CreatedEventResponse = response.json().await.map_err(|e| {
            BooklineError::integration(
                IntegrationSystem::Calendar,
                Some(status.as_u16()),
                format!("invalid event response: {e}"),
            )
        })?;
        info!(event_id = %created.id, "calendar event created");
        Ok(CreatedEvent { id: created.id, html_link: created.html_link })
    }
}
