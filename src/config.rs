use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout for fetch operations in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

// =============================================================================
// Forge defaults
// =============================================================================

/// Forge polled when none is configured
pub const DEFAULT_FORGE_URL: &str = "https://forge.puppetlabs.com";

pub const USER_AGENT: &str = "forge-poller";

// =============================================================================
// Configuration keys read from the host
// =============================================================================

/// Base address of the forge (repository configuration)
pub const FORGE_URL: &str = "FORGE_URL";
/// Module to poll, as `author/module` (package configuration)
pub const MODULE_NAME: &str = "MODULE_NAME";
/// Lowest version to report, inclusive (package configuration)
pub const LOWER_VERSION_BOUND_INCLUSIVE: &str = "LOWER_VERSION_BOUND_INCLUSIVE";
/// Version to stay below, exclusive (package configuration)
pub const UPPER_VERSION_BOUND_EXCLUSIVE: &str = "UPPER_VERSION_BOUND_EXCLUSIVE";

/// Poller tuning
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PollerConfig {
    /// Per-request timeout in milliseconds
    pub fetch_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: FETCH_TIMEOUT_MS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// A raw key/value bag handed over by the host
///
/// Values may be missing or null. [`Configuration::get`] hides the
/// difference: anything absent or blank reads as an empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    properties: IndexMap<String, Option<String>>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property, replacing any previous value for `key`
    pub fn with(mut self, key: &str, value: Option<&str>) -> Self {
        self.properties
            .insert(key.to_string(), value.map(|v| v.to_string()));
        self
    }

    /// Trimmed value for `key`, or `""` if missing, null or blank
    pub fn get(&self, key: &str) -> &str {
        self.properties
            .get(key)
            .and_then(|value| value.as_deref())
            .map(str::trim)
            .unwrap_or("")
    }

    #[cfg(test)]
    fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }
}

/// Accepts both `{"KEY": "v"}` and the host's `{"KEY": {"value": "v"}}`
#[derive(Deserialize)]
#[serde(untagged)]
enum PropertyValue {
    Plain(Option<String>),
    Wrapped { value: Option<String> },
}

impl<'de> Deserialize<'de> for Configuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, PropertyValue>::deserialize(deserializer)?;
        let properties = raw
            .into_iter()
            .map(|(key, value)| match value {
                PropertyValue::Plain(value) | PropertyValue::Wrapped { value } => (key, value),
            })
            .collect();
        Ok(Self { properties })
    }
}

/// Returns the path to the data directory for forge-poller.
/// Uses $XDG_DATA_HOME/forge-poller if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/forge-poller,
/// or ./forge-poller if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("forge-poller.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("forge-poller")
}
