//! Unified error types for rumahsubsidi.
//!
//! Each variant is one failure class of the proxy and its clients, and maps to
//! exactly one HTTP status via [`Error::status_code`].

/// Unified error type shared by the proxy server, the client library and the CLI.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Bad input shape (e.g. a malformed NIK). Raised before any I/O.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The external service could not be reached or did not answer in time.
    #[error("UPSTREAM_UNAVAILABLE: {0}")]
    UpstreamUnavailable(String),

    /// The external service answered with a non-success status.
    #[error("UPSTREAM_HTTP_ERROR: status {status}: {details}")]
    UpstreamHttp { status: u16, details: String },

    /// The expected embedded data was absent from an otherwise successful page.
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),

    /// Malformed JSON where valid JSON was expected.
    #[error("PARSE_ERROR: {0}")]
    Parse(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// The local proxy server did not answer at all.
    #[error("PROXY_UNREACHABLE: {0}")]
    ProxyUnreachable(String),

    /// Anything else.
    #[error("INTERNAL_ERROR: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status this error is surfaced with.
    ///
    /// Upstream failures relay the upstream status; a status that is not a valid
    /// HTTP error code falls back to 502.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidInput(_) => 400,
            Error::ExtractFailed(_) => 404,
            Error::UpstreamUnavailable(_) => 503,
            Error::UpstreamHttp { status, .. } if (400..=599).contains(status) => *status,
            Error::UpstreamHttp { .. } | Error::ProxyUnreachable(_) => 502,
            Error::Parse(_) | Error::InvalidUrl(_) | Error::Internal(_) => 500,
        }
    }

    /// The underlying message without the error-class prefix.
    pub fn details(&self) -> String {
        match self {
            Error::InvalidInput(msg)
            | Error::UpstreamUnavailable(msg)
            | Error::ExtractFailed(msg)
            | Error::Parse(msg)
            | Error::InvalidUrl(msg)
            | Error::ProxyUnreachable(msg)
            | Error::Internal(msg) => msg.clone(),
            Error::UpstreamHttp { details, .. } => details.clone(),
        }
    }

    /// Localized message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidInput(msg) => msg.clone(),
            Error::ProxyUnreachable(_) => "Proxy server belum berjalan! Jalankan rumahsubsidi-proxy lalu coba lagi.".into(),
            Error::UpstreamUnavailable(_) => "Layanan sedang tidak dapat dihubungi. Silakan coba lagi nanti.".into(),
            Error::ExtractFailed(_) => "Data tidak ditemukan.".into(),
            other => format!("Terjadi kesalahan: {}", other.details()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ExtractFailed("window.SIKUMBANG_DATA not found".to_string());
        assert!(err.to_string().contains("EXTRACT_FAILED"));
        assert!(err.to_string().contains("SIKUMBANG_DATA"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::InvalidInput("x".into()).status_code(), 400);
        assert_eq!(Error::ExtractFailed("x".into()).status_code(), 404);
        assert_eq!(Error::UpstreamUnavailable("x".into()).status_code(), 503);
        assert_eq!(Error::Parse("x".into()).status_code(), 500);
        assert_eq!(Error::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_upstream_status_is_relayed() {
        let err = Error::UpstreamHttp { status: 404, details: "not found".into() };
        assert_eq!(err.status_code(), 404);

        let err = Error::UpstreamHttp { status: 302, details: "redirect loop".into() };
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn test_details_strips_prefix() {
        let err = Error::UpstreamUnavailable("connection refused".into());
        assert_eq!(err.details(), "connection refused");
    }

    #[test]
    fn test_proxy_unreachable_message_mentions_proxy() {
        let err = Error::ProxyUnreachable("tcp connect error".into());
        assert!(err.user_message().contains("Proxy server belum berjalan"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::Parse(_)));
    }
}
