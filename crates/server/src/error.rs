//! HTTP error responses for the proxy server.
//!
//! Every failure is answered with `{ success: false, error, details, status? }`:
//!
//! | error | HTTP | `error` |
//! |---|---|---|
//! | `InvalidInput` | 400 | the validation message |
//! | `ExtractFailed` | 404 | `Data not found in page` |
//! | `UpstreamHttp` | relayed | `API error` (with `status`) |
//! | `UpstreamUnavailable` | 503 | `No response from <upstream>` |
//! | anything else | 500 | `Internal server error` |

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rumahsubsidi_client::Upstream;
use rumahsubsidi_core::Error;
use rumahsubsidi_core::model::ErrorBody;

/// An error paired with the upstream it came from.
#[derive(Debug, thiserror::Error)]
#[error("{upstream}: {error}")]
pub struct ProxyError {
    pub upstream: Upstream,
    pub error: Error,
}

impl ProxyError {
    pub fn new(upstream: Upstream, error: Error) -> Self {
        Self { upstream, error }
    }

    /// Status code and body for this error.
    pub fn to_parts(&self) -> (StatusCode, ErrorBody) {
        let details = self.error.details();
        let (status, body) = match &self.error {
            Error::InvalidInput(msg) => (400, ErrorBody { success: false, error: msg.clone(), details: None, status: None }),
            Error::ExtractFailed(_) => (404, ErrorBody::new("Data not found in page", details)),
            Error::UpstreamHttp { status, .. } => {
                (self.error.status_code(), ErrorBody::new("API error", details).with_status(*status))
            }
            Error::UpstreamUnavailable(_) => (503, ErrorBody::new(self.upstream.no_response_label(), details)),
            Error::Parse(_) | Error::InvalidUrl(_) | Error::ProxyUnreachable(_) | Error::Internal(_) => {
                (500, ErrorBody::new("Internal server error", details))
            }
        };
        (StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), body)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_parts();
        if status.is_server_error() {
            tracing::error!(upstream = %self.upstream, status = status.as_u16(), error = %self.error, "request failed");
        } else {
            tracing::warn!(upstream = %self.upstream, status = status.as_u16(), error = %self.error, "request rejected");
        }
        (status, Json(body)).into_response()
    }
}
