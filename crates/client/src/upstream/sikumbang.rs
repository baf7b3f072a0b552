//! Sikumbang listing-detail client.
//!
//! Fetches `base_url + detail_path + "/" + id` and extracts the JSON object the
//! page assigns to its data global.

use reqwest::{Client, header};
use rumahsubsidi_core::Error;
use rumahsubsidi_core::config::{HttpConfig, SikumbangConfig};
use serde_json::Value;
use std::time::Instant;
use url::Url;

use super::{HTML_ACCEPT, Upstream};
use crate::extract::EmbeddedJson;
use crate::fetch::{build_http, canonicalize, classify, ensure_success, join_endpoint, push_segment};

/// Redirect limit for detail pages.
const MAX_REDIRECTS: usize = 5;

/// Client for Sikumbang listing-detail pages.
#[derive(Debug, Clone)]
pub struct SikumbangClient {
    http: Client,
    detail_base: Url,
    extractor: EmbeddedJson,
    accept_language: String,
}

impl SikumbangClient {
    pub fn new(sikumbang: &SikumbangConfig, http: &HttpConfig) -> Result<Self, Error> {
        let base = canonicalize(&sikumbang.base_url)?;
        let detail_base = join_endpoint(&base, &sikumbang.detail_path)?;
        let extractor = EmbeddedJson::new(&sikumbang.data_global)?;
        let client = build_http(&http.user_agent, Some(sikumbang.timeout()), MAX_REDIRECTS)?;

        Ok(Self { http: client, detail_base, extractor, accept_language: http.accept_language.clone() })
    }

    /// Detail page URL for `id`, with the id percent-encoded as one path segment.
    pub fn detail_url(&self, id: &str) -> Result<Url, Error> {
        if id.trim().is_empty() {
            return Err(Error::InvalidInput("ID perumahan is required".into()));
        }
        Ok(push_segment(self.detail_base.clone(), id)?)
    }

    /// Fetch the detail page for `id` and return its embedded data object.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput` for a blank id (no request is made)
    /// - `Error::ExtractFailed` when the page carries no data assignment
    /// - `Error::Parse` when the assignment is unterminated or not JSON
    /// - `Error::UpstreamHttp` / `Error::UpstreamUnavailable` as for any upstream call
    pub async fn detail(&self, id: &str) -> Result<Value, Error> {
        let start = Instant::now();
        let url = self.detail_url(id)?;
        tracing::info!(id = id.trim(), %url, "fetching listing detail");

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, HTML_ACCEPT)
            .header(header::ACCEPT_LANGUAGE, &self.accept_language)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(id = id.trim(), error = %e, "error fetching listing detail");
                classify(&e, Upstream::Sikumbang.name())
            })?;

        let status = response.status();
        if let Err(err) = ensure_success(status, Upstream::Sikumbang.name()) {
            tracing::error!(id = id.trim(), status = status.as_u16(), "Sikumbang returned an error status");
            return Err(err);
        }

        let html = response
            .text()
            .await
            .map_err(|e| classify(&e, Upstream::Sikumbang.name()))?;

        let data = self.extractor.extract(&html).inspect_err(|e| {
            tracing::error!(id = id.trim(), error = %e, "embedded data not usable");
        })?;

        let name = data.get("namaPerumahan").and_then(Value::as_str).unwrap_or("Unknown");
        tracing::info!(
            id = id.trim(),
            nama_perumahan = name,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "extracted listing detail"
        );

        Ok(data)
    }
}
