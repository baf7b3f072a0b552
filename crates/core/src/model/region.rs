//! Administrative regions and region-name matching.

use serde::{Deserialize, Serialize};

/// A region as listed by the Sikumbang wilayah endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    #[serde(rename = "kodeWilayah")]
    pub code: String,
    #[serde(rename = "namaWilayah")]
    pub name: String,
}

impl Region {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self { code: code.into(), name: name.into() }
    }
}

/// Sort regions by name, as the selection lists show them.
pub fn sort_by_name(regions: &mut [Region]) {
    regions.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
}

/// Indonesian provinces as reverse geocoders spell them.
///
/// Used to pick a province out of a free-text display name when the
/// structured address fields are missing.
pub const KNOWN_PROVINCES: [&str; 38] = [
    "Aceh",
    "Sumatera Utara",
    "Sumatera Barat",
    "Riau",
    "Kepulauan Riau",
    "Jambi",
    "Sumatera Selatan",
    "Kepulauan Bangka Belitung",
    "Bengkulu",
    "Lampung",
    "DKI Jakarta",
    "Jawa Barat",
    "Banten",
    "Jawa Tengah",
    "DI Yogyakarta",
    "Jawa Timur",
    "Bali",
    "Nusa Tenggara Barat",
    "Nusa Tenggara Timur",
    "Kalimantan Barat",
    "Kalimantan Tengah",
    "Kalimantan Selatan",
    "Kalimantan Timur",
    "Kalimantan Utara",
    "Sulawesi Utara",
    "Gorontalo",
    "Sulawesi Tengah",
    "Sulawesi Barat",
    "Sulawesi Selatan",
    "Sulawesi Tenggara",
    "Maluku",
    "Maluku Utara",
    "Papua",
    "Papua Barat",
    "Papua Barat Daya",
    "Papua Tengah",
    "Papua Pegunungan",
    "Papua Selatan",
];

fn normalize(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Find the known province mentioned in a free-text display name.
///
/// The longest matching province wins, so "Papua Barat Daya" is preferred over
/// "Papua" for `"Sorong, Papua Barat Daya, Indonesia"`.
pub fn find_known_province(display_name: &str) -> Option<&'static str> {
    let haystack = normalize(display_name);
    KNOWN_PROVINCES
        .iter()
        .filter(|province| {
            let needle = province.to_lowercase();
            haystack
                .split(',')
                .map(str::trim)
                .any(|segment| segment == needle || segment.ends_with(&format!(" {needle}")))
        })
        .max_by_key(|province| province.len())
        .copied()
}

/// Match a free-text region name against canonical regions.
///
/// 1. Exact match, case-insensitive, whitespace-normalized.
/// 2. Otherwise a bidirectional substring match; it only succeeds when exactly
///    one region matches.
///
/// Returns `None` when nothing (or more than one region) matches.
pub fn match_region<'a>(name: &str, regions: &'a [Region]) -> Option<&'a Region> {
    let wanted = normalize(name);
    if wanted.is_empty() {
        return None;
    }

    if let Some(exact) = regions.iter().find(|r| normalize(&r.name) == wanted) {
        return Some(exact);
    }

    let mut candidates = regions.iter().filter(|r| {
        let canonical = normalize(&r.name);
        !canonical.is_empty() && (canonical.contains(&wanted) || wanted.contains(&canonical))
    });

    match (candidates.next(), candidates.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}
