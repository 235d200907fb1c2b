//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// External system an integration error originated from.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationSystem {
    #[error("calendar")]
    Calendar,
    #[error("crm")]
    Crm,
}

/// Main error type for Bookline
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum BooklineError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    /// A caller-imposed budget was exceeded; distinct from a network fault so
    /// callers can tell a slow dependency from an unreachable one.
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Validation failure on the booking itself (expired link, already
    /// completed, ...). Terminal: returned before any external call.
    #[error("Booking validation failed: {0}")]
    Validation(String),

    #[error("{system} integration error (status {status:?}): {message}")]
    Integration {
        system: IntegrationSystem,
        status: Option<u16>,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BooklineError {
    /// Build an integration error, truncating the response excerpt so raw
    /// bodies (which may be large) never bloat logs. Callers must not pass
    /// credentials or tokens in `body`.
    pub fn integration(
        system: IntegrationSystem,
        status: Option<u16>,
        body: impl AsRef<str>,
    ) -> Self {
        Self::Integration { system, status, message: truncate_excerpt(body.as_ref()) }
    }
}

const MAX_EXCERPT_LEN: usize = 300;

/// Truncate a response body to a log-safe excerpt on a char boundary.
pub fn truncate_excerpt(body: &str) -> String {
    if body.len() <= MAX_EXCERPT_LEN {
        return body.to_string();
    }
    let mut end = MAX_EXCERPT_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

/// Result type alias for Bookline operations
pub type Result<T> = std::result::Result<T, BooklineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_bodies_on_char_boundary() {
        let body = "é".repeat(400);
        let excerpt = truncate_excerpt(&body);
        assert!(excerpt.len() <= MAX_EXCERPT_LEN + '…'.len_utf8());
        assert!(excerpt.ends_with('…'));
    }

    #[test]
    fn short_bodies_pass_through() {
        assert_eq!(truncate_excerpt("ok"), "ok");
    }

    #[test]
    fn integration_error_tags_system() {
        let err = BooklineError::integration(IntegrationSystem::Crm, Some(500), "boom");
        assert!(err.to_string().contains("crm"));
        assert!(err.to_string().contains("500"));
    }
}
