//! Configuration management.
//!
//! # Configuration File Format
//!
//! ```toml
//! [search]
//! endpoint = "https://api.bing.microsoft.com"
//! subscription_key = "your-key"
//! market = "en-US"
//! safe_search = "Moderate"
//! log_requests = false
//!
//! [export]
//! base_folder = "./dataset"
//! overwrite = false
//! ```
//!
//! Every value can be overridden from the environment with the
//! `BING_DATASET__` prefix, e.g. `BING_DATASET__SEARCH__SUBSCRIPTION_KEY`.
//! When no file is used at all, the endpoint and key fall back to
//! `BING_SEARCH_ENDPOINT` and `BING_SEARCH_KEY`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::models::SafeSearchMode;

/// Default public Bing endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.bing.microsoft.com";

/// Market sent with every request
pub const DEFAULT_MARKET: &str = "en-US";

const CONFIG_FILE_NAME: &str = "bing-image-dataset.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Search service settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Dataset export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Settings handed to the search client
#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL, without the `/bing/v7.0` path
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Value for the `Ocp-Apim-Subscription-Key` header
    #[serde(default = "default_subscription_key")]
    pub subscription_key: String,

    #[serde(default = "default_market")]
    pub market: String,

    /// Safe search level used when a command does not pick one
    #[serde(default)]
    pub safe_search: SafeSearchMode,

    /// Log every outbound request URL at debug level
    #[serde(default)]
    pub log_requests: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            subscription_key: default_subscription_key(),
            market: default_market(),
            safe_search: SafeSearchMode::default(),
            log_requests: false,
        }
    }
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("endpoint", &self.endpoint)
            .field("subscription_key", &"<redacted>")
            .field("market", &self.market)
            .field("safe_search", &self.safe_search)
            .field("log_requests", &self.log_requests)
            .finish()
    }
}

impl SearchConfig {
    /// Create settings for an endpoint and key
    pub fn new(endpoint: impl Into<String>, subscription_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            subscription_key: subscription_key.into(),
            market: default_market(),
            safe_search: SafeSearchMode::default(),
            log_requests: false,
        }
    }

    /// Enable or disable request logging
    pub fn log_requests(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }
}

fn default_endpoint() -> String {
    std::env::var("BING_SEARCH_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string())
}

fn default_subscription_key() -> String {
    std::env::var("BING_SEARCH_KEY").unwrap_or_default()
}

fn default_market() -> String {
    DEFAULT_MARKET.to_string()
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Folder that receives `Images/<label>/...`
    #[serde(default = "default_base_folder")]
    pub base_folder: PathBuf,

    /// Replace files that already exist
    #[serde(default)]
    pub overwrite: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            base_folder: default_base_folder(),
            overwrite: false,
        }
    }
}

fn default_base_folder() -> PathBuf {
    PathBuf::from("./dataset")
}

impl Config {
    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix("BING_DATASET")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize()
}

/// Get the default configuration (from env vars or defaults)
pub fn get_config() -> Config {
    Config::default()
}

/// Look for a config file in the working directory, then the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("bing-image-dataset").join("config.toml"))
        .filter(|path| path.is_file())
}
