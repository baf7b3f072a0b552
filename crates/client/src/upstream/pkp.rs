//! PKP eligibility forwarder.
//!
//! Posts a multipart form (`j=1`, `nik=<id>`) to the PKP endpoint and hands the
//! HTML answer back untouched. Parsing the result table is the caller's job
//! (see [`crate::extract::parse_eligibility_page`]).

use reqwest::{Client, header, multipart::Form};
use rumahsubsidi_core::Error;
use rumahsubsidi_core::config::{HttpConfig, PkpConfig};
use rumahsubsidi_core::model::Nik;
use std::time::Instant;
use url::Url;

use super::{HTML_ACCEPT, Upstream};
use crate::fetch::{build_http, canonicalize, classify, ensure_success};

/// Client for the PKP eligibility service.
#[derive(Debug, Clone)]
pub struct PkpClient {
    http: Client,
    url: Url,
    accept_language: String,
}

impl PkpClient {
    pub fn new(pkp: &PkpConfig, http: &HttpConfig) -> Result<Self, Error> {
        let url = canonicalize(&pkp.url)?;
        let client = build_http(&http.user_agent, Some(pkp.timeout()), pkp.max_redirects)?;
        Ok(Self { http: client, url, accept_language: http.accept_language.clone() })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Look up `nik` and return the raw HTML answer.
    ///
    /// # Errors
    ///
    /// - `Error::UpstreamHttp` when PKP answers with a non-success status
    /// - `Error::UpstreamUnavailable` when it does not answer (including timeout)
    pub async fn check(&self, nik: &Nik) -> Result<String, Error> {
        let start = Instant::now();
        tracing::info!(nik = %nik, "checking subsidy eligibility");

        let form = Form::new().text("j", "1").text("nik", nik.as_str().to_string());

        let response = self
            .http
            .post(self.url.as_str())
            .header(header::ACCEPT, HTML_ACCEPT)
            .header(header::ACCEPT_LANGUAGE, &self.accept_language)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(nik = %nik, error = %e, "error calling PKP API");
                classify(&e, Upstream::Pkp.name())
            })?;

        let status = response.status();
        if let Err(err) = ensure_success(status, Upstream::Pkp.name()) {
            tracing::error!(nik = %nik, status = status.as_u16(), "PKP API returned an error status");
            return Err(err);
        }

        let html = response.text().await.map_err(|e| classify(&e, Upstream::Pkp.name()))?;

        tracing::info!(
            nik = %nik,
            bytes = html.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "got response from PKP API"
        );

        Ok(html)
    }
}
