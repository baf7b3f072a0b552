//! Route handlers.

pub mod cek_subsidi;
pub mod detail;
pub mod health;

pub const CEK_SUBSIDI: &str = "/api/cek-subsidi";
pub const DETAIL_PERUMAHAN: &str = "/api/detail-perumahan";
