//! Client code for rumahsubsidi.
//!
//! This crate provides the cached Sikumbang API client, the upstream clients
//! the proxy forwards to, page data extraction, the proxy client and region
//! detection, shared by the server and CLI.

pub mod api;
pub mod extract;
pub mod fetch;
pub mod geo;
pub mod proxy;
pub mod upstream;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{SearchQuery, SikumbangApi};
pub use extract::{EmbeddedJson, balanced_object, parse_eligibility_page};
pub use fetch::{FetchClient, FetchConfig};
pub use geo::{
    Coordinates, DetectOutcome, FileRegionStore, FixedLocation, GeocodedPlace, LocationProvider, MemoryRegionStore,
    NominatimGeocoder, RegionDetector, RegionStore, ReverseGeocoder,
};
pub use proxy::ProxyClient;
pub use upstream::{PkpClient, SikumbangClient, Upstream};
