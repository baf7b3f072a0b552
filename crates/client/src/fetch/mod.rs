//! HTTP fetch wrapper with a response cache.
//!
//! ### Cache
//! - A call with a cache key returns a fresh cached value without touching the network.
//! - Successful JSON responses are stored under the key before they are returned.
//!
//! ### Request
//! - `GET base_url + endpoint` with `Cache-Control: no-cache` so intermediaries revalidate.
//! - Redirects are followed automatically (default limit: 5).
//! - No client-side timeout unless configured; no retries.
//!
//! ### Errors
//! - Non-2xx status: `Error::UpstreamHttp { status }`.
//! - No response: `Error::UpstreamUnavailable`.
//! - Body is not the expected JSON: `Error::Parse`.

pub mod url;

use reqwest::{Client, StatusCode, header};
use rumahsubsidi_core::{Error, TtlCache};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};

pub use url::{UrlError, canonicalize, join_endpoint, push_segment};

/// Default user agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str = "rumahsubsidi/0.1";

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Base URL every endpoint is appended to.
    pub base_url: String,

    /// User agent string (default: "rumahsubsidi/0.1")
    pub user_agent: String,

    /// Request timeout (default: none)
    pub timeout: Option<Duration>,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sikumbang.tapera.go.id".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            max_redirects: 5,
        }
    }
}

/// Build a reqwest client with the shared settings of every outbound call.
pub(crate) fn build_http(user_agent: &str, timeout: Option<Duration>, max_redirects: usize) -> Result<Client, Error> {
    let mut builder = Client::builder()
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(max_redirects))
        .use_rustls_tls()
        .gzip(true)
        .brotli(true)
        .deflate(true);

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| Error::Internal(format!("failed to build HTTP client: {e}")))
}

/// Classify a reqwest failure into the shared error taxonomy.
///
/// Anything that left us without a complete response (connect failure, timeout,
/// redirect limit, truncated body) means the upstream is unavailable.
pub(crate) fn classify(err: &reqwest::Error, upstream: &str) -> Error {
    if err.is_builder() {
        Error::Internal(format!("invalid request to {upstream}: {err}"))
    } else if err.is_decode() {
        Error::Parse(format!("invalid response from {upstream}: {err}"))
    } else if let Some(status) = err.status() {
        Error::UpstreamHttp { status: status.as_u16(), details: err.to_string() }
    } else {
        Error::UpstreamUnavailable(format!("{upstream}: {err}"))
    }
}

/// Turn a non-success status into `Error::UpstreamHttp`.
pub(crate) fn ensure_success(status: StatusCode, upstream: &str) -> Result<(), Error> {
    if status.is_success() {
        return Ok(());
    }
    Err(Error::UpstreamHttp {
        status: status.as_u16(),
        details: format!("{upstream} responded with status {}", status.as_u16()),
    })
}

/// JSON API client that consults a [`TtlCache`] before going to the network.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    base_url: ::url::Url,
    cache: TtlCache<Value>,
}

impl FetchClient {
    /// Create a new fetch client over `cache`.
    pub fn new(config: FetchConfig, cache: TtlCache<Value>) -> Result<Self, Error> {
        let base_url = canonicalize(&config.base_url)?;
        let http = build_http(&config.user_agent, config.timeout, config.max_redirects)?;
        Ok(Self { http, base_url, cache })
    }

    /// Fetch `endpoint` as JSON, using `cache_key` for the cache when given.
    ///
    /// A fresh cached value is returned without a network call. Otherwise the
    /// endpoint is requested, the body parsed as JSON and, when a key is given,
    /// stored before returning.
    pub async fn fetch_with_cache<T: DeserializeOwned>(&self, endpoint: &str, cache_key: Option<&str>) -> Result<T, Error> {
        if let Some(key) = cache_key
            && let Some(cached) = self.cache.get(key).await
        {
            tracing::debug!(key, "cache hit");
            return serde_json::from_value(cached).map_err(Error::from);
        }

        let value = self.fetch_json(endpoint).await?;
        let typed: T = serde_json::from_value(value.clone())?;

        if let Some(key) = cache_key {
            self.cache.set(key, value).await;
            tracing::debug!(key, "cache stored");
        }

        Ok(typed)
    }

    /// Fetch `endpoint` as raw JSON, bypassing the cache.
    pub async fn fetch_json(&self, endpoint: &str) -> Result<Value, Error> {
        let start = Instant::now();
        let url = join_endpoint(&self.base_url, endpoint)?;

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "application/json, text/plain, */*")
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| classify(&e, self.base_url.as_str()))?;

        let status = response.status();
        if let Err(err) = ensure_success(status, self.base_url.as_str()) {
            tracing::warn!(%url, status = status.as_u16(), "API error");
            return Err(err);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify(&e, self.base_url.as_str()))?;

        let value: Value = serde_json::from_slice(&bytes)?;

        tracing::debug!("fetched {} in {}ms ({} bytes)", url, start.elapsed().as_millis(), bytes.len());

        Ok(value)
    }

    /// The cache consulted by [`fetch_with_cache`](Self::fetch_with_cache).
    pub fn cache(&self) -> &TtlCache<Value> {
        &self.cache
    }

    pub fn base_url(&self) -> &::url::Url {
        &self.base_url
    }
}
