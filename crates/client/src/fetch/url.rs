//! URL handling for configured base URLs and endpoint paths.

/// Error type for URL handling failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("empty path segment")]
    EmptySegment,

    #[error("relative path segment: {0}")]
    DotSegment(String),
}

impl From<UrlError> for rumahsubsidi_core::Error {
    fn from(err: UrlError) -> Self {
        match err {
            UrlError::EmptySegment | UrlError::DotSegment(_) => rumahsubsidi_core::Error::InvalidInput(err.to_string()),
            other => rumahsubsidi_core::Error::InvalidUrl(other.to_string()),
        }
    }
}

/// Canonicalize a configured base URL.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str().map(str::to_lowercase) {
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Append an endpoint (path plus optional query) to a base URL.
///
/// Unlike `Url::join`, any path on the base is kept: `https://host/api` +
/// `/ajax/x?a=1` gives `https://host/api/ajax/x?a=1`.
pub fn join_endpoint(base: &url::Url, endpoint: &str) -> Result<url::Url, UrlError> {
    let mut base_str = base.as_str().trim_end_matches('/').to_string();
    if let Some(query_start) = base_str.find('?') {
        base_str.truncate(query_start);
    }

    let endpoint = endpoint.trim();
    let joined = if endpoint.is_empty() {
        format!("{base_str}/")
    } else if endpoint.starts_with('/') {
        format!("{base_str}{endpoint}")
    } else {
        format!("{base_str}/{endpoint}")
    };

    url::Url::parse(&joined).map_err(|e| UrlError::InvalidUrl(e.to_string()))
}

/// Append `segment` as one percent-encoded path segment.
///
/// The segment is trimmed; `/`, `?` and `#` inside it are encoded rather than
/// interpreted. `.` and `..` are rejected since they would be dropped.
pub fn push_segment(mut url: url::Url, segment: &str) -> Result<url::Url, UrlError> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Err(UrlError::EmptySegment);
    }
    if segment == "." || segment == ".." {
        return Err(UrlError::DotSegment(segment.to_string()));
    }

    let cannot_be_base = UrlError::InvalidUrl(format!("{url} cannot be a base"));
    url.path_segments_mut()
        .map_err(|_| cannot_be_base)?
        .pop_if_empty()
        .push(segment);

    Ok(url)
}
