//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, MAX_REGION_TTL_HOURS};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 300_000;

fn check_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if value < MIN_TIMEOUT_MS {
        return Err(ConfigError::Invalid { field: field.into(), reason: "must be at least 100ms".into() });
    }
    if value > MAX_TIMEOUT_MS {
        return Err(ConfigError::Invalid {
            field: field.into(),
            reason: "must not exceed 5 minutes (300000ms)".into(),
        });
    }
    Ok(())
}

fn check_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ConfigError::Invalid { field: field.into(), reason: format!("not a valid URL: {e}") })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::Invalid { field: field.into(), reason: format!("unsupported scheme: {scheme}") }),
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `server.port` is 0
    /// - any upstream URL is not an http(s) URL
    /// - any timeout is less than 100ms or exceeds 5 minutes
    /// - `pkp.max_redirects` exceeds 20
    /// - `geo.region_ttl_hours` is outside 1..=8760
    /// - `cache.ttl_secs` or `cache.max_entries` is 0
    /// - `http.user_agent` or `sikumbang.data_global` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid { field: "server.port".into(), reason: "must not be 0".into() });
        }

        check_url("sikumbang.base_url", &self.sikumbang.base_url)?;
        check_url("pkp.url", &self.pkp.url)?;
        check_url("geo.geocoder_url", &self.geo.geocoder_url)?;

        check_timeout("sikumbang.timeout_ms", self.sikumbang.timeout_ms)?;
        check_timeout("pkp.timeout_ms", self.pkp.timeout_ms)?;
        check_timeout("geo.location_timeout_ms", self.geo.location_timeout_ms)?;

        if self.pkp.max_redirects > 20 {
            return Err(ConfigError::Invalid { field: "pkp.max_redirects".into(), reason: "must not exceed 20".into() });
        }

        if !(1..=MAX_REGION_TTL_HOURS).contains(&self.geo.region_ttl_hours) {
            return Err(ConfigError::Invalid {
                field: "geo.region_ttl_hours".into(),
                reason: format!("must be between 1 and {MAX_REGION_TTL_HOURS}"),
            });
        }

        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Invalid { field: "cache.ttl_secs".into(), reason: "must be greater than 0".into() });
        }
        if self.cache.max_entries == 0 {
            return Err(ConfigError::Invalid {
                field: "cache.max_entries".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.http.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "http.user_agent".into(), reason: "must not be empty".into() });
        }
        if self.sikumbang.data_global.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "sikumbang.data_global".into(),
                reason: "must not be empty".into(),
            });
        }

        if !self.sikumbang.detail_path.starts_with('/') {
            tracing::warn!(
                detail_path = %self.sikumbang.detail_path,
                "sikumbang.detail_path does not start with '/'; it is appended to the base URL as-is"
            );
        }

        Ok(())
    }
}
