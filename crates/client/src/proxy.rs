//! Client for the rumahsubsidi proxy server.
//!
//! Browser pages cannot call PKP or Sikumbang directly, so they talk to the
//! proxy instead. [`ProxyClient`] does the same from Rust: it validates input
//! locally, calls the proxy endpoints and turns the answers into typed results.
//!
//! When the proxy itself cannot be reached the error is
//! [`Error::ProxyUnreachable`], whose user message says the proxy is not running.

use reqwest::{Client, StatusCode, header};
use rumahsubsidi_core::Error;
use rumahsubsidi_core::model::{DetailResponse, EligibilityOutcome, ErrorBody, Nik};
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

use crate::extract::parse_eligibility_page;
use crate::fetch::{DEFAULT_USER_AGENT, build_http, canonicalize, classify, join_endpoint, push_segment};

/// Default proxy location.
pub const DEFAULT_PROXY_URL: &str = "http://localhost:3000";

pub const CEK_SUBSIDI_PATH: &str = "/api/cek-subsidi";
pub const DETAIL_PATH: &str = "/api/detail-perumahan";

/// Client for the proxy's eligibility and listing-detail endpoints.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: Client,
    base_url: Url,
}

impl ProxyClient {
    /// Create a client for the proxy at `base_url`, with an optional request timeout.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, Error> {
        let base_url = canonicalize(base_url)?;
        let http = build_http(DEFAULT_USER_AGENT, timeout, 5)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Check subsidy eligibility for `nik`.
    ///
    /// The NIK is validated before any request; an invalid one is
    /// `Error::InvalidInput` and never leaves the process.
    pub async fn check_eligibility(&self, nik: &str) -> Result<EligibilityOutcome, Error> {
        let nik = Nik::parse(nik)?;
        let url = join_endpoint(&self.base_url, CEK_SUBSIDI_PATH)?;
        tracing::debug!(nik = %nik, %url, "checking eligibility via proxy");

        let response = self
            .http
            .post(url.as_str())
            .header(header::ACCEPT, "text/html, application/json")
            .json(&json!({ "nik": nik.as_str() }))
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.request_error(&e))?;
        if !status.is_success() {
            return Err(error_from_proxy(status, &body));
        }

        let outcome = parse_eligibility_page(&body);
        tracing::debug!(nik = %nik, eligible = outcome.is_eligible(), rows = outcome.rows().len(), "eligibility parsed");
        Ok(outcome)
    }

    /// Fetch the embedded data object of listing `id` through the proxy.
    pub async fn listing_detail(&self, id: &str) -> Result<Value, Error> {
        if id.trim().is_empty() {
            return Err(Error::InvalidInput("ID perumahan is required".into()));
        }
        let url = push_segment(join_endpoint(&self.base_url, DETAIL_PATH)?, id)?;

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.request_error(&e))?;
        if !status.is_success() {
            return Err(error_from_proxy(status, &body));
        }

        let detail: DetailResponse = serde_json::from_str(&body)?;
        if !detail.success {
            return Err(Error::Internal("proxy reported failure without an error status".into()));
        }
        Ok(detail.data)
    }

    /// A request that never got an answer from the proxy.
    fn request_error(&self, err: &reqwest::Error) -> Error {
        if err.is_connect() {
            tracing::warn!(proxy = %self.base_url, "proxy server is not reachable");
            Error::ProxyUnreachable(format!("{}: {err}", self.base_url))
        } else {
            classify(err, "proxy")
        }
    }
}

/// Rebuild the error the proxy reported from its status and JSON body.
///
/// The proxy's `error` field is surfaced as the message; a body that is not
/// the expected JSON falls back to the bare status.
fn error_from_proxy(status: StatusCode, body: &str) -> Error {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => match err.details {
            Some(details) if !details.is_empty() && details != err.error => format!("{}: {details}", err.error),
            _ => err.error,
        },
        Err(_) => format!("HTTP error! status: {}", status.as_u16()),
    };

    match status {
        StatusCode::BAD_REQUEST => Error::InvalidInput(message),
        StatusCode::NOT_FOUND if body.contains("Data not found in page") => Error::ExtractFailed(message),
        StatusCode::SERVICE_UNAVAILABLE => Error::UpstreamUnavailable(message),
        StatusCode::INTERNAL_SERVER_ERROR => Error::Internal(message),
        other => Error::UpstreamHttp { status: other.as_u16(), details: message },
    }
}
