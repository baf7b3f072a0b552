//! Domain model shared by the proxy server and its clients.

pub mod eligibility;
pub mod listing;
pub mod nik;
pub mod region;
pub mod wire;

pub use eligibility::{COLUMN_HEADERS, EligibilityOutcome, EligibilityRow};
pub use listing::{HouseType, Listing, ListingFilter, ListingStats, SearchResponse};
pub use nik::Nik;
pub use region::{KNOWN_PROVINCES, Region, find_known_province, match_region};
pub use wire::{DetailResponse, ErrorBody};
