//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (RUMAH_*)
//! 2. Config file (RUMAH_CONFIG_FILE, or `env.yaml` in the working directory)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml, Yaml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Upper bound for `geo.region_ttl_hours` (one year).
pub const MAX_REGION_TTL_HOURS: u64 = 8_760;

/// Config file looked up when `RUMAH_CONFIG_FILE` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "env.yaml";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (RUMAH_*, nested keys separated by `__`)
/// 2. Config file (YAML, or TOML when the file ends in `.toml`)
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub sikumbang: SikumbangConfig,

    #[serde(default)]
    pub pkp: PkpConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub geo: GeoConfig,
}

/// Listen address of the proxy server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Set via RUMAH_SERVER__HOST.
    #[serde(default = "default_host")]
    pub host: String,

    /// Set via RUMAH_SERVER__PORT.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Sikumbang housing-data site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SikumbangConfig {
    /// Base URL for both the ajax API and the listing pages.
    #[serde(default = "default_sikumbang_base_url")]
    pub base_url: String,

    /// Path prefix of a listing detail page; the listing id is appended.
    #[serde(default = "default_detail_path")]
    pub detail_path: String,

    /// Global assignment holding the listing JSON inside the detail page.
    #[serde(default = "default_data_global")]
    pub data_global: String,

    #[serde(default = "default_upstream_timeout_ms")]
    pub timeout_ms: u64,
}

/// PKP subsidy-eligibility service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PkpConfig {
    #[serde(default = "default_pkp_url")]
    pub url: String,

    #[serde(default = "default_upstream_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

/// Headers sent on every outbound request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

/// Client-side response cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,

    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,

    /// Interval of the background expiry sweep. Zero disables the sweeper.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// Region detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoConfig {
    /// Reverse-geocoding endpoint (Nominatim compatible).
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,

    #[serde(default = "default_location_timeout_ms")]
    pub location_timeout_ms: u64,

    /// How long a detected region code is reused.
    #[serde(default = "default_region_ttl_hours")]
    pub region_ttl_hours: u64,
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

fn default_sikumbang_base_url() -> String {
    "https://sikumbang.tapera.go.id".into()
}

fn default_detail_path() -> String {
    "/lokasi-perumahan".into()
}

fn default_data_global() -> String {
    "window.SIKUMBANG_DATA".into()
}

fn default_upstream_timeout_ms() -> u64 {
    30_000
}

fn default_pkp_url() -> String {
    "https://my.pkp.go.id/cekbantuan".into()
}

fn default_max_redirects() -> usize {
    5
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
}

fn default_accept_language() -> String {
    "id-ID,id;q=0.9,en-US;q=0.8,en;q=0.7".into()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_cache_max_entries() -> usize {
    256
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org/reverse".into()
}

fn default_location_timeout_ms() -> u64 {
    5_000
}

fn default_region_ttl_hours() -> u64 {
    24
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl Default for SikumbangConfig {
    fn default() -> Self {
        Self {
            base_url: default_sikumbang_base_url(),
            detail_path: default_detail_path(),
            data_global: default_data_global(),
            timeout_ms: default_upstream_timeout_ms(),
        }
    }
}

impl Default for PkpConfig {
    fn default() -> Self {
        Self { url: default_pkp_url(), timeout_ms: default_upstream_timeout_ms(), max_redirects: default_max_redirects() }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { user_agent: default_user_agent(), accept_language: default_accept_language() }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            max_entries: default_cache_max_entries(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            geocoder_url: default_geocoder_url(),
            location_timeout_ms: default_location_timeout_ms(),
            region_ttl_hours: default_region_ttl_hours(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SikumbangConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl PkpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// `None` when the background sweep is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

impl GeoConfig {
    pub fn location_timeout(&self) -> Duration {
        Duration::from_millis(self.location_timeout_ms)
    }

    /// Falls back to the default for values `validate` would reject.
    pub fn region_ttl(&self) -> chrono::Duration {
        let hours = if (1..=MAX_REGION_TTL_HOURS).contains(&self.region_ttl_hours) {
            self.region_ttl_hours
        } else {
            default_region_ttl_hours()
        };
        chrono::Duration::try_hours(hours as i64).unwrap_or_else(|| chrono::Duration::hours(24))
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `RUMAH_`
    /// 2. The file named by `RUMAH_CONFIG_FILE`, else `env.yaml` if it exists
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `RUMAH_CONFIG_FILE` names a file that does not exist
    /// - The configuration file or environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var("RUMAH_CONFIG_FILE").ok().map(PathBuf::from);

        let file = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigError::LoadFailed(format!("config file {} not found", path.display())));
            }
            Some(path) => Some(path),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
        };

        Self::load_from(file.as_deref())
    }

    /// Load from an explicit file (if any) plus `RUMAH_` environment variables.
    pub fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = file {
            tracing::debug!(path = %path.display(), "loading configuration file");
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                _ => figment.merge(Yaml::file(path)),
            };
        }

        figment = figment.merge(
            Env::prefixed("RUMAH_")
                .ignore(&["CONFIG_FILE", "LOG_FORMAT"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration, falling back to built-in defaults on any failure.
    ///
    /// The failure is logged at `warn`; it is never fatal.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => {
                tracing::info!("configuration loaded");
                config
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load configuration, using defaults");
                Self::default()
            }
        }
    }
}
