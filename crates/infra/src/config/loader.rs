//! Configuration loader
//!
//! Loads adapter configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file into the environment when one is present
//! 2. Attempts to load from environment variables
//! 3. If incomplete, falls back to loading from file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PM_ENDPOINT_URL`: Endpoint URL (required)
//! - `PM_CUSTOMER_KEY`, `PM_USER`, `PM_PASSWORD`: API credential (required)
//! - `PM_PRACTICE_NAME`: Practice display name (required)
//! - `PM_PRACTICE_ID`: Practice identifier for resource elements
//! - `PM_NAMESPACE`, `PM_ACTION_BASE`: Schema namespace and action prefix
//! - `PM_CLIENT_MODE`: `raw` or `typed`
//! - `PM_TIMEOUT_SECS`, `PM_TIMEZONE`
//! - `PM_BATCH_SIZE`, `PM_CALL_DELAY_MS`, `PM_BATCH_DELAY_MS`,
//!   `PM_POST_LISTING_DELAY_MS`: Batch throttling
//! - `PM_DEFAULT_REASON_ID`, `PM_DEFAULT_REASON_GUID`,
//!   `PM_DEFAULT_REASON_NAME`: Appointment reason defaults
//! - `PM_REGIONS`: Comma-separated region keys; for each region `R`,
//!   `PM_REGION_<R>_RESOURCE_GUID`, `PM_REGION_<R>_PROVIDER_GUID`,
//!   `PM_REGION_<R>_PRACTICE_GUID`
//! - `PM_DEBUG_ENVELOPES`, `PM_DEBUG_RESPONSES`: Debug logging (true/false)
//! - `PM_LOG_LEVEL`, `PM_LOG_JSON`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./practicebridge.toml` or `./practicebridge.json` (current working
//!    directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names one directory up
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use practicebridge_domain::{BridgeError, Result};

use super::settings::{AdapterConfig, RawConfig, RawRegion};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `BridgeError::Config` if configuration cannot be loaded from
/// either source, the file format is invalid, or required fields are
/// missing.
pub fn load() -> Result<AdapterConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

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

/// Load configuration from environment variables
///
/// # Errors
/// Returns `BridgeError::Config` if required variables are missing or
/// have invalid values.
pub fn load_from_env() -> Result<AdapterConfig> {
    raw_from_env()?.into_config()
}

fn raw_from_env() -> Result<RawConfig> {
    let mut raw = RawConfig {
        endpoint_url: Some(env_var("PM_ENDPOINT_URL")?),
        namespace: env_opt("PM_NAMESPACE"),
        action_base: env_opt("PM_ACTION_BASE"),
        customer_key: Some(env_var("PM_CUSTOMER_KEY")?),
        user: Some(env_var("PM_USER")?),
        password: Some(env_var("PM_PASSWORD")?),
        practice_name: Some(env_var("PM_PRACTICE_NAME")?),
        practice_id: env_opt("PM_PRACTICE_ID"),
        client_mode: env_opt("PM_CLIENT_MODE"),
        timeout_secs: env_parse("PM_TIMEOUT_SECS")?,
        timezone: env_opt("PM_TIMEZONE"),
        batch_size: env_parse("PM_BATCH_SIZE")?,
        call_delay_ms: env_parse("PM_CALL_DELAY_MS")?,
        batch_delay_ms: env_parse("PM_BATCH_DELAY_MS")?,
        post_listing_delay_ms: env_parse("PM_POST_LISTING_DELAY_MS")?,
        default_reason_id: env_opt("PM_DEFAULT_REASON_ID"),
        default_reason_guid: env_opt("PM_DEFAULT_REASON_GUID"),
        default_reason_name: env_opt("PM_DEFAULT_REASON_NAME"),
        debug_envelopes: env_bool("PM_DEBUG_ENVELOPES", false),
        debug_responses: env_bool("PM_DEBUG_RESPONSES", false),
        log_level: env_opt("PM_LOG_LEVEL"),
        log_json: env_bool("PM_LOG_JSON", false),
        ..Default::default()
    };

    for region in env_opt("PM_REGIONS").iter().flat_map(|list| list.split(',')) {
        let key = region.trim().to_ascii_uppercase();
        if key.is_empty() {
            continue;
        }
        let overrides = RawRegion {
            resource_guid: env_opt(&format!("PM_REGION_{key}_RESOURCE_GUID")),
            provider_guid: env_opt(&format!("PM_REGION_{key}_PROVIDER_GUID")),
            practice_guid: env_opt(&format!("PM_REGION_{key}_PRACTICE_GUID")),
        };
        raw.regions.insert(key, overrides);
    }

    Ok(raw)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
///
/// # Errors
/// Returns `BridgeError::Config` if the file is missing or unreadable, the
/// format is invalid, or required fields are missing.
pub fn load_from_file(path: Option<PathBuf>) -> Result<AdapterConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(BridgeError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            BridgeError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| BridgeError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)?.into_config()
}

/// Parse configuration from string content, by file extension.
fn parse_config(contents: &str, path: &Path) -> Result<RawConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| BridgeError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| BridgeError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(BridgeError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] =
        ["practicebridge.toml", "practicebridge.json", "config.toml", "config.json"];

    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(NAMES.iter().map(|name| cwd.join(name)));
        candidates.extend(NAMES.iter().map(|name| cwd.join("..").join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `BridgeError::Config` if the variable is unset or blank.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        BridgeError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| BridgeError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
