//! Nominatim reverse geocoder.
//!
//! Requests `format=jsonv2`, `zoom=5` (state level) and `accept-language=id`
//! so province names come back in their Indonesian spelling.

use async_trait::async_trait;
use reqwest::{Client, header};
use rumahsubsidi_core::Error;
use serde::Deserialize;
use url::Url;

use super::{Coordinates, GeocodedPlace, ReverseGeocoder};
use crate::fetch::{build_http, canonicalize, classify, ensure_success};

/// Default reverse endpoint.
pub const DEFAULT_REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// Zoom level that resolves to a state/province.
const STATE_ZOOM: u8 = 5;

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<Address>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Address {
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    region: Option<String>,
}

/// Reverse geocoder backed by a Nominatim instance.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: Client,
    url: Url,
    language: String,
}

impl NominatimGeocoder {
    /// Nominatim asks clients to identify themselves, so `user_agent` must not be empty.
    pub fn new(reverse_url: &str, user_agent: &str) -> Result<Self, Error> {
        if user_agent.trim().is_empty() {
            return Err(Error::InvalidInput("user agent is required for Nominatim".into()));
        }
        let url = canonicalize(reverse_url)?;
        let http = build_http(user_agent, None, 5)?;
        Ok(Self { http, url, language: "id".to_string() })
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    fn request_url(&self, coords: Coordinates) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair("format", "jsonv2")
            .append_pair("lat", &coords.latitude.to_string())
            .append_pair("lon", &coords.longitude.to_string())
            .append_pair("zoom", &STATE_ZOOM.to_string())
            .append_pair("accept-language", &self.language);
        url
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, coords: Coordinates) -> Result<GeocodedPlace, Error> {
        let url = self.request_url(coords);

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "application/json")
            .header(header::ACCEPT_LANGUAGE, &self.language)
            .send()
            .await
            .map_err(|e| classify(&e, "Nominatim"))?;

        ensure_success(response.status(), "Nominatim")?;

        let bytes = response.bytes().await.map_err(|e| classify(&e, "Nominatim"))?;
        let body: ReverseResponse = serde_json::from_slice(&bytes)?;

        if let Some(error) = body.error {
            return Err(Error::ExtractFailed(format!("Nominatim: {error}")));
        }

        let address = body.address.unwrap_or(Address { state: None, region: None });
        Ok(GeocodedPlace { state: address.state, region: address.region, display_name: body.display_name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubServer;
    use axum::Router;
    use axum::extract::Query;
    use axum::routing::get;
    use serde_json::json;
    use std::collections::HashMap;

    fn geocoder(url: &str) -> NominatimGeocoder {
        NominatimGeocoder::new(url, "rumahsubsidi-test").unwrap()
    }

    #[test]
    fn test_request_url() {
        let url = geocoder(DEFAULT_REVERSE_URL).request_url(Coordinates::new(-6.9, 107.6));
        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["format"], "jsonv2");
        assert_eq!(pairs["zoom"], "5");
        assert_eq!(pairs["accept-language"], "id");
        assert_eq!(pairs["lat"], "-6.9");
        assert_eq!(pairs["lon"], "107.6");
    }

    #[test]
    fn test_requires_user_agent() {
        assert!(NominatimGeocoder::new(DEFAULT_REVERSE_URL, " ").is_err());
    }

    #[tokio::test]
    async fn test_reverse_reads_address() {
        let router = Router::new().route(
            "/reverse",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("zoom").map(String::as_str), Some("5"));
                axum::Json(json!({
                    "display_name": "Jawa Barat, Indonesia",
                    "address": { "state": "Jawa Barat", "country": "Indonesia" }
                }))
            }),
        );
        let stub = StubServer::start(router).await;

        let place = geocoder(&format!("{}/reverse", stub.url()))
            .reverse(Coordinates::new(-6.9, 107.6))
            .await
            .unwrap();
        assert_eq!(place.state.as_deref(), Some("Jawa Barat"));
        assert_eq!(place.region, None);
        assert_eq!(place.display_name.as_deref(), Some("Jawa Barat, Indonesia"));
    }

    #[tokio::test]
    async fn test_reverse_error_body() {
        let router =
            Router::new().route("/reverse", get(|| async { axum::Json(json!({ "error": "Unable to geocode" })) }));
        let stub = StubServer::start(router).await;

        let err = geocoder(&format!("{}/reverse", stub.url()))
            .reverse(Coordinates::new(0.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExtractFailed(_)));
    }
}
