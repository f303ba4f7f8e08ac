//! Adapter configuration
//!
//! Built once at startup and shared by `Arc`; nothing in it changes after
//! construction.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono_tz::Tz;
use practicebridge_core::{BatchPolicy, ClientMode, ReasonDefaults, RegionOverrides};
use practicebridge_domain::constants::{
    DEFAULT_BATCH_DELAY_MS, DEFAULT_BATCH_SIZE, DEFAULT_CALL_DELAY_MS,
    DEFAULT_POST_LISTING_DELAY_MS, DEFAULT_SCHEMA_NAMESPACE, DEFAULT_TIMEOUT_SECS,
};
use practicebridge_domain::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::observability::LoggingConfig;
use crate::protocol::Credential;

/// Debug logging toggles. Envelopes are redacted before they are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugToggles {
    pub envelopes: bool,
    pub responses: bool,
}

#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub endpoint: Url,
    pub namespace: String,
    pub action_base: String,
    pub credential: Credential,
    /// Practice-scope identifier, used inside resource elements only.
    pub practice_id: Option<String>,
    pub client_mode: ClientMode,
    pub timeout: Duration,
    pub timezone: Tz,
    pub batch: BatchPolicy,
    pub post_listing_delay: Duration,
    pub reason_defaults: ReasonDefaults,
    /// Keyed by upper-cased region name.
    pub regions: HashMap<String, RegionOverrides>,
    pub debug: DebugToggles,
    pub logging: LoggingConfig,
}

impl AdapterConfig {
    /// Configuration with every optional setting at its default.
    pub fn new(endpoint: Url, credential: Credential) -> Self {
        Self {
            endpoint,
            namespace: DEFAULT_SCHEMA_NAMESPACE.to_string(),
            action_base: default_action_base(DEFAULT_SCHEMA_NAMESPACE),
            credential,
            practice_id: None,
            client_mode: ClientMode::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            timezone: Tz::UTC,
            batch: BatchPolicy::default(),
            post_listing_delay: Duration::from_millis(DEFAULT_POST_LISTING_DELAY_MS),
            reason_defaults: ReasonDefaults::default(),
            regions: HashMap::new(),
            debug: DebugToggles::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Overrides for a region, matched case-insensitively.
    pub fn region(&self, key: &str) -> Option<&RegionOverrides> {
        self.regions.get(&key.trim().to_ascii_uppercase())
    }
}

pub(crate) fn default_action_base(namespace: &str) -> String {
    format!("{}/KareoServices/", namespace.trim_end_matches('/'))
}

/// Per-region GUIDs as they appear in a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRegion {
    pub resource_guid: Option<String>,
    pub provider_guid: Option<String>,
    pub practice_guid: Option<String>,
}

/// Untyped settings, from the environment or a file. Everything is optional
/// here; [`RawConfig::into_config`] enforces what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub endpoint_url: Option<String>,
    pub namespace: Option<String>,
    pub action_base: Option<String>,
    pub customer_key: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub practice_name: Option<String>,
    pub practice_id: Option<String>,
    pub client_mode: Option<String>,
    pub timeout_secs: Option<u64>,
    pub timezone: Option<String>,
    pub batch_size: Option<usize>,
    pub call_delay_ms: Option<u64>,
    pub batch_delay_ms: Option<u64>,
    pub post_listing_delay_ms: Option<u64>,
    pub default_reason_id: Option<String>,
    pub default_reason_guid: Option<String>,
    pub default_reason_name: Option<String>,
    pub regions: BTreeMap<String, RawRegion>,
    pub debug_envelopes: bool,
    pub debug_responses: bool,
    pub log_level: Option<String>,
    pub log_json: bool,
}

impl RawConfig {
    /// Validate and type the settings.
    ///
    /// # Errors
    /// `BridgeError::Config` naming the first missing or malformed value.
    pub fn into_config(self) -> Result<AdapterConfig> {
        let endpoint_url = required(self.endpoint_url, "endpoint_url")?;
        let endpoint = Url::parse(&endpoint_url)
            .map_err(|e| BridgeError::Config(format!("Invalid endpoint URL: {}", e)))?;

        let credential = Credential::new(
            required(self.customer_key, "customer_key")?,
            required(self.user, "user")?,
            required(self.password, "password")?,
            required(self.practice_name, "practice_name")?,
        );

        let namespace = non_blank(self.namespace).unwrap_or_else(|| DEFAULT_SCHEMA_NAMESPACE.into());
        let action_base =
            non_blank(self.action_base).unwrap_or_else(|| default_action_base(&namespace));

        let client_mode = match non_blank(self.client_mode).as_deref().map(str::to_ascii_lowercase) {
            None => ClientMode::default(),
            Some(mode) if mode == "raw" => ClientMode::Raw,
            Some(mode) if mode == "typed" => ClientMode::Typed,
            Some(other) => {
                return Err(BridgeError::Config(format!(
                    "Invalid client mode: {} (expected raw or typed)",
                    other
                )))
            }
        };

        let timezone = match non_blank(self.timezone) {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|e| BridgeError::Config(format!("Invalid timezone {}: {}", name, e)))?,
            None => Tz::UTC,
        };

        let regions = self
            .regions
            .into_iter()
            .map(|(key, raw)| {
                (
                    key.trim().to_ascii_uppercase(),
                    RegionOverrides {
                        practice_guid: non_blank(raw.practice_guid),
                        provider_guid: non_blank(raw.provider_guid),
                        resource_guid: non_blank(raw.resource_guid),
                    },
                )
            })
            .collect();

        Ok(AdapterConfig {
            endpoint,
            namespace,
            action_base,
            credential,
            practice_id: non_blank(self.practice_id),
            client_mode,
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1)),
            timezone,
            batch: BatchPolicy {
                batch_size: self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE).max(1),
                call_delay: Duration::from_millis(self.call_delay_ms.unwrap_or(DEFAULT_CALL_DELAY_MS)),
                batch_delay: Duration::from_millis(
                    self.batch_delay_ms.unwrap_or(DEFAULT_BATCH_DELAY_MS),
                ),
            },
            post_listing_delay: Duration::from_millis(
                self.post_listing_delay_ms.unwrap_or(DEFAULT_POST_LISTING_DELAY_MS),
            ),
            reason_defaults: ReasonDefaults {
                id: non_blank(self.default_reason_id),
                guid: non_blank(self.default_reason_guid),
                name: non_blank(self.default_reason_name),
            },
            regions,
            debug: DebugToggles { envelopes: self.debug_envelopes, responses: self.debug_responses },
            logging: LoggingConfig {
                level: non_blank(self.log_level).unwrap_or_else(|| "info".into()),
                json: self.log_json,
            },
        })
    }
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    non_blank(value).ok_or_else(|| BridgeError::Config(format!("Missing required setting: {}", key)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
