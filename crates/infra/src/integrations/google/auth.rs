//! Access token management for the calendar provider.
//!
//! Tokens live in the `calendar_connections` table. A token within the
//! refresh threshold of expiry is refreshed through the refresh-token grant
//! before use, and the new token is persisted so concurrent flows see it.

use std::sync::Arc;

use bookline_core::{Clock, ConnectionRepository};
use bookline_domain::constants::TOKEN_REFRESH_THRESHOLD_SECS;
use bookline_domain::{BooklineError, CalendarConfig, Result};
use chrono::Duration;
use reqwest::Method;
use tracing::{debug, info, instrument};

use super::types::TokenResponse;
use crate::http::HttpClient;

pub struct GoogleTokenProvider {
    http: HttpClient,
    connections: Arc<dyn ConnectionRepository>,
    settings: CalendarConfig,
    clock: Arc<dyn Clock>,
}

impl GoogleTokenProvider {
    pub fn new(
        http: HttpClient,
        connections: Arc<dyn ConnectionRepository>,
        settings: CalendarConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { http, connections, settings, clock }
    }

    /// A valid access token for the user's connection, refreshing first if
    /// the stored one is at or near expiry.
    #[instrument(skip(self))]
    pub async fn access_token(&self, user_id: &str) -> Result<String> {
        let connection = self
            .connections
            .get(user_id)
            .await?
            .ok_or_else(|| BooklineError::Auth(format!("no calendar connection for {user_id}")))?;

        let now = self.clock.now();
        if !connection.expires_within(now, TOKEN_REFRESH_THRESHOLD_SECS) {
            debug!(user_id, "stored access token still valid");
            return Ok(connection.access_token);
        }

        info!(user_id, "access token near expiry; refreshing");
        let request = self
            .http
            .request(Method::POST, &self.settings.token_endpoint)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", connection.refresh_token.as_str()),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
            ]);
        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BooklineError::Auth(format!(
                "token refresh failed with status {status}: {}",
                bookline_domain::truncate_excerpt(&body)
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| BooklineError::Auth(format!("invalid token response: {e}")))?;
        let expires_at = now + Duration::seconds(token.expires_in);
        self.connections.update_tokens(user_id, &token.access_token, expires_at).await?;
        Ok(token.access_token)
    }
}
