//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `BOOKLINE_DB_PATH`: Database file path
//! - `BOOKLINE_DB_POOL_SIZE`: Connection pool size
//! - `BOOKLINE_CALENDAR_API_BASE_URL`: Calendar API base URL
//! - `BOOKLINE_CALENDAR_TOKEN_ENDPOINT`: OAuth token endpoint
//! - `BOOKLINE_CALENDAR_CLIENT_ID`: OAuth client id
//! - `BOOKLINE_CALENDAR_CLIENT_SECRET`: OAuth client secret
//! - `BOOKLINE_CRM_BASE_URL`: CRM API base URL
//! - `BOOKLINE_CRM_ACCESS_TOKEN`: CRM bearer token
//! - `BOOKLINE_CRM_EVENT_TYPE_ID`: Numeric CRM event type
//! - `BOOKLINE_CRM_LOCATION_ID`: Numeric CRM location (optional)
//!
//! ## File Locations
//! The loader probes `config.{json,toml}` and `bookline.{json,toml}` in the
//! working directory, up to two parent directories, and next to the
//! executable.

use std::path::{Path, PathBuf};

use bookline_domain::{
    BooklineError, CalendarConfig, Config, CrmConfig, DatabaseConfig, Result,
};

/// Load configuration with automatic fallback strategy.
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables.
///
/// All required environment variables must be present; see the module
/// documentation for the complete list.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("BOOKLINE_DB_PATH")?;
    let db_pool_size = env_var("BOOKLINE_DB_POOL_SIZE").and_then(|s| {
        s.parse::<u32>().map_err(|e| BooklineError::Config(format!("Invalid pool size: {e}")))
    })?;

    let calendar = CalendarConfig {
        api_base_url: env_var("BOOKLINE_CALENDAR_API_BASE_URL")?,
        token_endpoint: env_var("BOOKLINE_CALENDAR_TOKEN_ENDPOINT")?,
        client_id: env_var("BOOKLINE_CALENDAR_CLIENT_ID")?,
        client_secret: env_var("BOOKLINE_CALENDAR_CLIENT_SECRET")?,
    };

    let crm = CrmConfig {
        base_url: env_var("BOOKLINE_CRM_BASE_URL")?,
        access_token: env_var("BOOKLINE_CRM_ACCESS_TOKEN")?,
        event_type_id: env_var("BOOKLINE_CRM_EVENT_TYPE_ID").and_then(|s| {
            s.parse::<i64>()
                .map_err(|e| BooklineError::Config(format!("Invalid event type id: {e}")))
        })?,
        location_id: match std::env::var("BOOKLINE_CRM_LOCATION_ID") {
            Ok(raw) => Some(raw.parse::<i64>().map_err(|e| {
                BooklineError::Config(format!("Invalid location id: {e}"))
            })?),
            Err(_) => None,
        },
    };

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        calendar,
        crm,
    })
}

/// Load configuration from a file.
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(BooklineError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            BooklineError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| BooklineError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| BooklineError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| BooklineError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(BooklineError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe standard paths for configuration files, returning the first found.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        for base in [&cwd, &cwd.join(".."), &cwd.join("../..")] {
            candidates.extend([
                base.join("config.json"),
                base.join("config.toml"),
                base.join("bookline.json"),
                base.join("bookline.toml"),
            ]);
        }
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend([
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("bookline.json"),
                exe_dir.join("bookline.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|p| p.exists())
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| BooklineError::Config(format!("Missing environment variable: {name}")))
}
