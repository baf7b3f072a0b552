//! JSON bodies exchanged between the proxy server and its clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Successful listing-detail answer: `{ "success": true, "data": {...} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailResponse {
    pub success: bool,
    pub data: Value,
}

impl DetailResponse {
    pub fn new(data: Value) -> Self {
        Self { success: true, data }
    }
}

/// Failure body: `{ "success": false, "error", "details", "status"? }`.
///
/// `status` is only present when an upstream status is relayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self { success: false, error: error.into(), details: Some(details.into()), status: None }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}
