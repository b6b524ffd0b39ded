//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (HARVEST_*)
//! 2. TOML config file (if HARVEST_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// How a successfully parsed genre page updates the stored genre record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPolicy {
    /// Write only when the stored record is missing, or is older than
    /// `max_age_secs` and differs from the page.
    #[default]
    Stale,
    /// Write on every successful parse.
    Always,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (HARVEST_*)
/// 2. TOML config file (if HARVEST_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Site root; genre pages live under `<base_url>/browse/genre/<id>`.
    ///
    /// Set via HARVEST_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via HARVEST_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Path to the SQLite catalog database.
    ///
    /// Set via HARVEST_CATALOG_DB_PATH environment variable.
    #[serde(default = "default_catalog_db_path")]
    pub catalog_db_path: PathBuf,

    /// Path to the SQLite HTTP response cache.
    ///
    /// Set via HARVEST_CACHE_DB_PATH environment variable.
    #[serde(default = "default_cache_db_path")]
    pub cache_db_path: PathBuf,

    /// HTTP request timeout in milliseconds. Unset means no timeout.
    ///
    /// Set via HARVEST_TIMEOUT_MS environment variable.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Maximum number of redirects to follow.
    ///
    /// Set via HARVEST_MAX_REDIRECTS environment variable.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Exclusive upper bound of the genre id space.
    ///
    /// Set via HARVEST_END_ID environment variable.
    #[serde(default = "default_end_id")]
    pub end_id: i64,

    /// Age in seconds after which a changed genre record is refreshed.
    ///
    /// Set via HARVEST_MAX_AGE_SECS environment variable.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,

    /// Response statuses stored in the response cache.
    ///
    /// Set via HARVEST_CACHEABLE_STATUSES environment variable (e.g. `[200,301,404]`).
    #[serde(default = "default_cacheable_statuses")]
    pub cacheable_statuses: Vec<u16>,

    /// Genre refresh policy: `stale` or `always`.
    ///
    /// Set via HARVEST_REFRESH_POLICY environment variable.
    #[serde(default)]
    pub refresh_policy: RefreshPolicy,
}

fn default_base_url() -> String {
    "https://www.netflix.com".into()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:104.0) Gecko/20100101 Firefox/104.0".into()
}

fn default_catalog_db_path() -> PathBuf {
    PathBuf::from("./netflix_genres.sqlite3")
}

fn default_cache_db_path() -> PathBuf {
    PathBuf::from("./requests_cache.sqlite")
}

fn default_max_redirects() -> usize {
    10
}

fn default_end_id() -> i64 {
    1_000_000
}

fn default_max_age_secs() -> u64 {
    2_629_800 // 365.25 / 12 days
}

fn default_cacheable_statuses() -> Vec<u16> {
    vec![200, 301, 404]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            catalog_db_path: default_catalog_db_path(),
            cache_db_path: default_cache_db_path(),
            timeout_ms: None,
            max_redirects: default_max_redirects(),
            end_id: default_end_id(),
            max_age_secs: default_max_age_secs(),
            cacheable_statuses: default_cacheable_statuses(),
            refresh_policy: RefreshPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Refresh threshold for genre records.
    ///
    /// Saturates at the largest representable duration; `validate` rejects
    /// values that would need to.
    pub fn max_age(&self) -> chrono::Duration {
        self.try_max_age().unwrap_or(chrono::Duration::MAX)
    }

    pub(crate) fn try_max_age(&self) -> Option<chrono::Duration> {
        i64::try_from(self.max_age_secs).ok().and_then(chrono::Duration::try_seconds)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `HARVEST_`
    /// 2. TOML file from `HARVEST_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("HARVEST_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("HARVEST_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
