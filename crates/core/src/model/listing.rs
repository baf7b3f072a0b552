//! Sikumbang housing listings.
//!
//! Canonical schema: house types live under `tipeRumah`. Older backend
//! responses name the same array `tipes`; it is accepted as an alias so callers
//! never branch on field presence.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// House-type status marking a subsidized unit.
pub const SUBSIDIZED_STATUS: &str = "subsidi";

/// One house type offered by a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseType {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub harga: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub kamar_tidur: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub kamar_mandi: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub luas_bangunan: f64,
}

impl HouseType {
    pub fn is_subsidized(&self) -> bool {
        self.status == SUBSIDIZED_STATUS
    }
}

/// Administrative location of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wilayah {
    #[serde(default, deserialize_with = "null_as_default")]
    pub provinsi: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kabupaten: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kecamatan: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kelurahan: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Developer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub nama: String,
}

/// A housing development as returned by the Sikumbang search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id_lokasi: String,
    pub nama_perumahan: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub aktivasi: bool,
    #[serde(default, alias = "tipes", deserialize_with = "null_as_default")]
    pub tipe_rumah: Vec<HouseType>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wilayah: Wilayah,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pengembang: Developer,
    #[serde(default, deserialize_with = "null_as_default")]
    pub foto: Vec<String>,
    #[serde(default)]
    pub koordinat_perumahan: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub jumlah_unit: u32,
}

impl Listing {
    /// First subsidized house type, if any.
    pub fn subsidized_type(&self) -> Option<&HouseType> {
        self.tipe_rumah.iter().find(|t| t.is_subsidized())
    }

    /// Active and offering at least one subsidized house type.
    pub fn is_subsidized(&self) -> bool {
        self.aktivasi && self.subsidized_type().is_some()
    }

    /// Parse `koordinatPerumahan` (`"lat, lng"`).
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let raw = self.koordinat_perumahan.as_deref()?;
        let mut parts = raw.split(',').map(|p| p.trim().parse::<f64>());
        let lat = parts.next()?.ok()?;
        let lng = parts.next()?.ok()?;
        if parts.next().is_some() || !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        Some((lat, lng))
    }
}

/// Aggregate counters returned alongside search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingStats {
    #[serde(default, deserialize_with = "lenient_count")]
    pub count_unit_subsidi: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub count_unit_ready: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub count_pengembang: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_lokasi: u64,
}

/// Body of `/ajax/lokasi/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Listing>,
    #[serde(default)]
    pub count: Option<ListingStats>,
}

impl SearchResponse {
    pub fn subsidized(&self) -> impl Iterator<Item = &Listing> {
        self.data.iter().filter(|l| l.is_subsidized())
    }
}

/// `null` reads as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Whole, non-negative count or price. Accepts integers, floats and numeric
/// strings; anything else (including `null`) reads as zero.
fn lenient_count<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(whole_number)
        .and_then(|n| T::try_from(n).ok())
        .unwrap_or_default())
}

fn whole_number(value: &Value) -> Option<u64> {
    let from_float = |f: f64| (f.is_finite() && f >= 0.0 && f < u64::MAX as f64).then(|| f.round() as u64);
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(from_float)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| s.parse::<f64>().ok().and_then(from_float))
        }
        _ => None,
    }
}

/// Narrowing applied to subsidized listings on the search page.
///
/// Empty string fields and `None` bounds do not filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFilter {
    #[serde(default)]
    pub provinsi: Option<String>,
    #[serde(default)]
    pub kabupaten: Option<String>,
    #[serde(default)]
    pub kecamatan: Option<String>,
    #[serde(default)]
    pub min_price: Option<u64>,
    #[serde(default)]
    pub max_price: Option<u64>,
    #[serde(default)]
    pub min_units: Option<u32>,
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        let Some(house) = listing.subsidized_type() else {
            return false;
        };

        let field_matches = |want: &Option<String>, have: &str| match want.as_deref() {
            Some(w) if !w.is_empty() => w == have,
            _ => true,
        };

        field_matches(&self.provinsi, &listing.wilayah.provinsi)
            && field_matches(&self.kabupaten, &listing.wilayah.kabupaten)
            && field_matches(&self.kecamatan, &listing.wilayah.kecamatan)
            && self.min_price.is_none_or(|min| house.harga >= min)
            && self.max_price.is_none_or(|max| house.harga <= max)
            && self.min_units.is_none_or(|units| listing.jumlah_unit >= units)
    }

    /// Subsidized listings that pass the filter, in input order.
    pub fn apply<'a>(&self, listings: &'a [Listing]) -> Vec<&'a Listing> {
        listings.iter().filter(|l| l.is_subsidized() && self.matches(l)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing(harga: u64, units: u32) -> Listing {
        serde_json::from_value(json!({
            "idLokasi": "abc123",
            "namaPerumahan": "Griya Asri",
            "aktivasi": true,
            "tipeRumah": [
                { "status": "komersil", "harga": 400000000 },
                { "status": "subsidi", "harga": harga, "kamarTidur": 2, "kamarMandi": 1, "luasBangunan": 36 }
            ],
            "wilayah": { "provinsi": "Jawa Barat", "kabupaten": "Bekasi", "kecamatan": "Tambun", "kelurahan": "Mekarsari" },
            "pengembang": { "nama": "PT Griya" },
            "foto": ["https://example.com/a.jpg"],
            "koordinatPerumahan": "-6.25, 107.05",
            "jumlahUnit": units
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_canonical_schema() {
        let l = listing(166_000_000, 10);
        assert_eq!(l.id_lokasi, "abc123");
        assert_eq!(l.tipe_rumah.len(), 2);
        assert_eq!(l.subsidized_type().unwrap().kamar_tidur, 2);
        assert!(l.is_subsidized());
    }

    #[test]
    fn test_deserialize_legacy_tipes_alias() {
        let l: Listing = serde_json::from_value(json!({
            "idLokasi": "x",
            "namaPerumahan": "Legacy",
            "aktivasi": true,
            "tipes": [{ "status": "subsidi", "harga": 150000000 }]
        }))
        .unwrap();
        assert_eq!(l.subsidized_type().unwrap().harga, 150_000_000);
    }

    #[test]
    fn test_search_tolerates_nulls_and_float_prices() {
        let response: SearchResponse = serde_json::from_value(json!({
            "data": [
                {
                    "idLokasi": "a1",
                    "namaPerumahan": "Griya Satu",
                    "aktivasi": true,
                    "foto": null,
                    "wilayah": null,
                    "pengembang": null,
                    "jumlahUnit": null,
                    "tipeRumah": [{ "status": "subsidi", "harga": 166000000.0, "kamarTidur": "2", "luasBangunan": null }]
                },
                {
                    "idLokasi": "b2",
                    "namaPerumahan": "Griya Dua",
                    "aktivasi": true,
                    "foto": ["https://example.com/b.jpg"],
                    "tipeRumah": [{ "status": "subsidi", "harga": 170000000 }]
                }
            ],
            "count": { "countUnitSubsidi": 12.0, "totalLokasi": null }
        }))
        .unwrap();

        assert_eq!(response.data.len(), 2);
        let first = &response.data[0];
        assert!(first.foto.is_empty());
        assert_eq!(first.wilayah, Wilayah::default());
        assert_eq!(first.jumlah_unit, 0);
        let house = first.subsidized_type().unwrap();
        assert_eq!(house.harga, 166_000_000);
        assert_eq!(house.kamar_tidur, 2);
        assert_eq!(house.luas_bangunan, 0.0);

        let stats = response.count.as_ref().unwrap();
        assert_eq!(stats.count_unit_subsidi, 12);
        assert_eq!(stats.total_lokasi, 0);
        assert_eq!(response.subsidized().count(), 2);
    }

    #[test]
    fn test_missing_required_field_fails() {
        let result: Result<Listing, _> = serde_json::from_value(json!({ "idLokasi": "x" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_inactive_listing_is_not_subsidized() {
        let mut l = listing(166_000_000, 10);
        l.aktivasi = false;
        assert!(!l.is_subsidized());
    }

    #[test]
    fn test_coordinates() {
        let mut l = listing(1, 1);
        assert_eq!(l.coordinates(), Some((-6.25, 107.05)));

        l.koordinat_perumahan = Some("nonsense".into());
        assert_eq!(l.coordinates(), None);

        l.koordinat_perumahan = Some("1, 2, 3".into());
        assert_eq!(l.coordinates(), None);

        l.koordinat_perumahan = None;
        assert_eq!(l.coordinates(), None);
    }

    #[test]
    fn test_filter_price_and_units() {
        let listings = vec![listing(160_000_000, 5), listing(180_000_000, 50), listing(190_000_000, 2)];

        let filter = ListingFilter { min_price: Some(170_000_000), min_units: Some(3), ..Default::default() };
        let hits = filter.apply(&listings);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].subsidized_type().unwrap().harga, 180_000_000);
    }

    #[test]
    fn test_filter_location_and_empty_fields() {
        let listings = vec![listing(160_000_000, 5)];

        let filter = ListingFilter { provinsi: Some(String::new()), kabupaten: Some("Bekasi".into()), ..Default::default() };
        assert_eq!(filter.apply(&listings).len(), 1);

        let filter = ListingFilter { kecamatan: Some("Cikarang".into()), ..Default::default() };
        assert!(filter.apply(&listings).is_empty());
    }

    #[test]
    fn test_search_response_subsidized() {
        let mut inactive = listing(1, 1);
        inactive.aktivasi = false;
        let response = SearchResponse { data: vec![listing(1, 1), inactive], count: None };
        assert_eq!(response.subsidized().count(), 1);
    }
}
