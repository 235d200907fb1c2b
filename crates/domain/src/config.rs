//! Application configuration structures
//!
//! Typed configuration consumed by the infra loader. Each component receives
//! its slice of this struct explicitly; there are no global singletons.

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub calendar: CalendarConfig,
    pub crm: CrmConfig,
}

/// SQLite database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path.
    pub path: String,
    /// Connection pool size.
    pub pool_size: u32,
}

/// Calendar provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Base URL of the calendar API (override for tests).
    pub api_base_url: String,
    /// OAuth token endpoint used for refresh-token grants.
    pub token_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
}

/// CRM / practice-management API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmConfig {
    /// Base URL of the CRM API (the `/v1` resources hang off this).
    pub base_url: String,
    /// Bearer token for the CRM API.
    pub access_token: String,
    /// Numeric event type the CRM requires on every appointment.
    pub event_type_id: i64,
    /// Numeric location id for in-person appointments, when configured.
    pub location_id: Option<i64>,
}
