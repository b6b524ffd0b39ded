//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `base_url` is not an http(s) URL, or carries a query or fragment
    /// - `user_agent` is empty
    /// - `timeout_ms` is set below 100ms or above 5 minutes
    /// - `end_id` is negative
    /// - `max_age_secs` does not fit a duration
    /// - `cacheable_statuses` is empty or holds a non-HTTP status
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid { field: "base_url".into(), reason: "must be an http(s) URL".into() });
        }

        if self.base_url.contains(['?', '#']) {
            return Err(ConfigError::Invalid {
                field: "base_url".into(),
                reason: "must not carry a query string or fragment".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if let Some(timeout_ms) = self.timeout_ms {
            if timeout_ms < 100 {
                return Err(ConfigError::Invalid {
                    field: "timeout_ms".into(),
                    reason: "must be at least 100ms".into(),
                });
            }
            if timeout_ms > 300_000 {
                return Err(ConfigError::Invalid {
                    field: "timeout_ms".into(),
                    reason: "must not exceed 5 minutes (300000ms)".into(),
                });
            }
        }

        if self.end_id < 0 {
            return Err(ConfigError::Invalid { field: "end_id".into(), reason: "must not be negative".into() });
        }

        if self.try_max_age().is_none() {
            return Err(ConfigError::Invalid {
                field: "max_age_secs".into(),
                reason: format!("{} seconds is out of range", self.max_age_secs),
            });
        }

        if self.cacheable_statuses.is_empty() {
            return Err(ConfigError::Invalid {
                field: "cacheable_statuses".into(),
                reason: "must list at least one status".into(),
            });
        }
        if let Some(bad) = self.cacheable_statuses.iter().find(|s| !(100..600).contains(*s)) {
            return Err(ConfigError::Invalid {
                field: "cacheable_statuses".into(),
                reason: format!("{bad} is not an HTTP status"),
            });
        }

        if !self.cacheable_statuses.contains(&200) {
            tracing::warn!(
                statuses = ?self.cacheable_statuses,
                "200 is not cacheable; every successful genre page will be re-fetched on the next run"
            );
        }

        Ok(())
    }
}
