//! Sikumbang JSON API operations.
//!
//! Region lists and listing searches go through [`FetchClient::fetch_with_cache`],
//! so repeated lookups within the cache TTL never reach the network.
//!
//! | operation | endpoint | cache key |
//! |---|---|---|
//! | [`SikumbangApi::provinces`] | `/ajax/wilayah/get-provinsi` | `provinsi_list` |
//! | [`SikumbangApi::regencies`] | `/ajax/wilayah/get-kabupaten/{code}` | `kabupaten_{code}` |
//! | [`SikumbangApi::districts`] | `/ajax/wilayah/get-kecamatan/{code}` | `kecamatan_{code}` |
//! | [`SikumbangApi::search`] | `/ajax/lokasi/search?...` | `search_{kodeWilayah}` or `search_properties` |

use rumahsubsidi_core::Error;
use rumahsubsidi_core::model::region::sort_by_name;
use rumahsubsidi_core::model::{Listing, ListingStats, Region, SearchResponse};
use url::form_urlencoded;

use crate::fetch::FetchClient;

pub const PROVINCES_ENDPOINT: &str = "/ajax/wilayah/get-provinsi";
pub const REGENCIES_ENDPOINT: &str = "/ajax/wilayah/get-kabupaten";
pub const DISTRICTS_ENDPOINT: &str = "/ajax/wilayah/get-kecamatan";
pub const SEARCH_ENDPOINT: &str = "/ajax/lokasi/search";

/// Query for the listing search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub sort: String,
    pub page: u32,
    pub limit: u32,
    /// Region code to restrict results to.
    pub kode_wilayah: Option<String>,
}

impl Default for SearchQuery {
    /// The search page query: newest first, first 100 listings.
    fn default() -> Self {
        Self { sort: "terbaru".into(), page: 1, limit: 100, kode_wilayah: None }
    }
}

impl SearchQuery {
    /// The landing page query: nearest first, 18 listings.
    pub fn featured() -> Self {
        Self { sort: "terdekat".into(), page: 1, limit: 18, kode_wilayah: None }
    }

    pub fn in_region(mut self, kode_wilayah: impl Into<String>) -> Self {
        let code = kode_wilayah.into();
        self.kode_wilayah = (!code.trim().is_empty()).then(|| code.trim().to_string());
        self
    }

    /// Endpoint with query string.
    pub fn endpoint(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("selectedSearch", "wilayah")
            .append_pair("skalaPerumahan", "semua")
            .append_pair("sort", &self.sort)
            .append_pair("searchBy", "nama-perumahan")
            .append_pair("page", &self.page.to_string())
            .append_pair("limit", &self.limit.to_string());
        if let Some(code) = &self.kode_wilayah {
            query.append_pair("kodeWilayah", code);
        }
        format!("{SEARCH_ENDPOINT}?{}", query.finish())
    }

    /// Cache key: `search_{kodeWilayah}` or `search_properties`.
    ///
    /// Sort, page and limit other than the defaults are appended so different
    /// pages never share an entry.
    pub fn cache_key(&self) -> String {
        let mut key = match &self.kode_wilayah {
            Some(code) => format!("search_{code}"),
            None => "search_properties".to_string(),
        };
        let defaults = SearchQuery::default();
        if (self.sort.as_str(), self.page, self.limit) != (defaults.sort.as_str(), defaults.page, defaults.limit) {
            key.push_str(&format!("_{}_{}_{}", self.sort, self.page, self.limit));
        }
        key
    }
}

/// Typed operations over the Sikumbang JSON API.
#[derive(Debug, Clone)]
pub struct SikumbangApi {
    fetch: FetchClient,
}

impl SikumbangApi {
    pub fn new(fetch: FetchClient) -> Self {
        Self { fetch }
    }

    pub fn fetch_client(&self) -> &FetchClient {
        &self.fetch
    }

    /// All provinces, sorted by name.
    pub async fn provinces(&self) -> Result<Vec<Region>, Error> {
        let mut regions: Vec<Region> = self
            .fetch
            .fetch_with_cache(PROVINCES_ENDPOINT, Some("provinsi_list"))
            .await?;
        sort_by_name(&mut regions);
        Ok(regions)
    }

    /// Regencies (kabupaten/kota) of a province, sorted by name.
    pub async fn regencies(&self, province_code: &str) -> Result<Vec<Region>, Error> {
        let code = region_code(province_code, "province")?;
        let mut regions: Vec<Region> = self
            .fetch
            .fetch_with_cache(&format!("{REGENCIES_ENDPOINT}/{code}"), Some(&format!("kabupaten_{code}")))
            .await?;
        sort_by_name(&mut regions);
        Ok(regions)
    }

    /// Districts (kecamatan) of a regency, sorted by name.
    pub async fn districts(&self, regency_code: &str) -> Result<Vec<Region>, Error> {
        let code = region_code(regency_code, "regency")?;
        let mut regions: Vec<Region> = self
            .fetch
            .fetch_with_cache(&format!("{DISTRICTS_ENDPOINT}/{code}"), Some(&format!("kecamatan_{code}")))
            .await?;
        sort_by_name(&mut regions);
        Ok(regions)
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, Error> {
        let response: SearchResponse = self
            .fetch
            .fetch_with_cache(&query.endpoint(), Some(&query.cache_key()))
            .await?;
        tracing::debug!(listings = response.data.len(), key = %query.cache_key(), "search loaded");
        Ok(response)
    }

    /// Aggregate counters from the landing page query.
    pub async fn statistics(&self) -> Result<Option<ListingStats>, Error> {
        Ok(self.search(&SearchQuery::featured()).await?.count)
    }

    /// Find a listing by `idLokasi` among the first search page.
    pub async fn find_listing(&self, id: &str) -> Result<Listing, Error> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::InvalidInput("ID perumahan is required".into()));
        }
        let response = self.search(&SearchQuery::default()).await?;
        response
            .data
            .into_iter()
            .find(|listing| listing.id_lokasi == id)
            .ok_or_else(|| Error::ExtractFailed(format!("listing {id} not found")))
    }
}

/// Region codes are numeric path segments; anything else never reaches the URL.
fn region_code<'a>(code: &'a str, kind: &str) -> Result<&'a str, Error> {
    let code = code.trim();
    if code.is_empty() {
        return Err(Error::InvalidInput(format!("{kind} code is required")));
    }
    if !code.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'.') {
        return Err(Error::InvalidInput(format!("invalid {kind} code: {code}")));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchConfig;
    use crate::testing::{StubServer, counted};
    use axum::Router;
    use axum::extract::{Path, Query};
    use axum::routing::get;
    use rumahsubsidi_core::TtlCache;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn api(base_url: &str) -> SikumbangApi {
        let cache = TtlCache::new(Duration::from_secs(300), 64);
        let fetch = FetchClient::new(FetchConfig { base_url: base_url.to_string(), ..Default::default() }, cache).unwrap();
        SikumbangApi::new(fetch)
    }

    fn listing(id: &str, status: &str) -> serde_json::Value {
        json!({
            "idLokasi": id,
            "namaPerumahan": format!("Perumahan {id}"),
            "aktivasi": true,
            "tipeRumah": [{ "status": status, "harga": 166000000 }],
            "jumlahUnit": 10
        })
    }

    fn router(hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                PROVINCES_ENDPOINT,
                get(counted(hits, || async {
                    axum::Json(json!([
                        { "kodeWilayah": "51", "namaWilayah": "Bali" },
                        { "kodeWilayah": "11", "namaWilayah": "Aceh" },
                        { "kodeWilayah": "32", "namaWilayah": "Jawa Barat" }
                    ]))
                })),
            )
            .route(
                "/ajax/wilayah/get-kabupaten/:code",
                get(|Path(code): Path<String>| async move {
                    axum::Json(json!([
                        { "kodeWilayah": format!("{code}.75"), "namaWilayah": "Kota Bekasi" },
                        { "kodeWilayah": format!("{code}.16"), "namaWilayah": "Bekasi" }
                    ]))
                }),
            )
            .route(
                "/ajax/wilayah/get-kecamatan/:code",
                get(|Path(code): Path<String>| async move {
                    axum::Json(json!([{ "kodeWilayah": format!("{code}.01"), "namaWilayah": "Tambun" }]))
                }),
            )
            .route(
                SEARCH_ENDPOINT,
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    let region = params.get("kodeWilayah").cloned().unwrap_or_default();
                    axum::Json(json!({
                        "data": [listing("abc123", "subsidi"), listing(&format!("r{region}"), "komersil")],
                        "count": { "countUnitSubsidi": 120, "countUnitReady": 40, "countPengembang": 7, "totalLokasi": 12 }
                    }))
                }),
            )
    }

    #[test]
    fn test_search_query_endpoint_and_key() {
        let query = SearchQuery::default();
        assert_eq!(query.cache_key(), "search_properties");
        assert!(query.endpoint().starts_with("/ajax/lokasi/search?selectedSearch=wilayah"));
        assert!(!query.endpoint().contains("kodeWilayah"));

        let query = SearchQuery::default().in_region("32");
        assert_eq!(query.cache_key(), "search_32");
        assert!(query.endpoint().ends_with("&kodeWilayah=32"));

        assert_eq!(SearchQuery::default().in_region("  ").kode_wilayah, None);
        assert_eq!(SearchQuery::featured().cache_key(), "search_properties_terdekat_1_18");
    }

    #[tokio::test]
    async fn test_provinces_sorted_and_cached() {
        let hits = Arc::new(AtomicUsize::new(0));
        let stub = StubServer::start(router(hits.clone())).await;
        let api = api(&stub.url());

        let provinces = api.provinces().await.unwrap();
        let names: Vec<_> = provinces.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Aceh", "Bali", "Jawa Barat"]);

        api.provinces().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(api.fetch_client().cache().get("provinsi_list").await.is_some());
    }

    #[tokio::test]
    async fn test_regencies_and_districts() {
        let stub = StubServer::start(router(Arc::new(AtomicUsize::new(0)))).await;
        let api = api(&stub.url());

        let regencies = api.regencies("32").await.unwrap();
        assert_eq!(regencies[0], Region::new("32.16", "Bekasi"));
        assert!(api.fetch_client().cache().get("kabupaten_32").await.is_some());

        let districts = api.districts("32.16").await.unwrap();
        assert_eq!(districts[0].name, "Tambun");
        assert!(api.fetch_client().cache().get("kecamatan_32.16").await.is_some());
    }

    #[tokio::test]
    async fn test_region_code_validation() {
        let api = api("http://127.0.0.1:9");
        assert!(matches!(api.regencies(" ").await, Err(Error::InvalidInput(_))));
        assert!(matches!(api.districts("../x").await, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_search_by_region() {
        let stub = StubServer::start(router(Arc::new(AtomicUsize::new(0)))).await;
        let api = api(&stub.url());

        let response = api.search(&SearchQuery::default().in_region("32")).await.unwrap();
        assert_eq!(response.data.len(), 2);
        assert_eq!(response.data[1].id_lokasi, "r32");
        assert_eq!(response.subsidized().count(), 1);
        assert!(api.fetch_client().cache().get("search_32").await.is_some());
    }

    #[tokio::test]
    async fn test_statistics_and_find_listing() {
        let stub = StubServer::start(router(Arc::new(AtomicUsize::new(0)))).await;
        let api = api(&stub.url());

        let stats = api.statistics().await.unwrap().unwrap();
        assert_eq!(stats.count_unit_subsidi, 120);

        let found = api.find_listing("abc123").await.unwrap();
        assert_eq!(found.nama_perumahan, "Perumahan abc123");
        assert!(matches!(api.find_listing("zzz").await, Err(Error::ExtractFailed(_))));
    }
}
