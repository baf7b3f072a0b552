//! Command-line interface parsing for the rumahsubsidi CLI.

use clap::{Args, Parser, Subcommand};
use rumahsubsidi_core::model::ListingFilter;
use std::path::PathBuf;

/// Subsidized housing lookups from the command line.
#[derive(Parser, Debug)]
#[command(name = "rumahsubsidi")]
#[command(about = "Check subsidy eligibility, browse Sikumbang listings and detect your region")]
#[command(version)]
pub struct Cli {
    /// Configuration file (YAML, or TOML when it ends in .toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Proxy server URL (default: http://localhost:<server.port>)
    #[arg(long, global = true, value_name = "URL")]
    pub proxy: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check subsidy eligibility for a 16-digit NIK through the proxy
    CekNik {
        /// National identity number
        nik: String,
    },
    /// Show the data embedded in a listing's detail page
    Detail {
        /// Listing id (idLokasi)
        id: String,
        /// Fetch the page directly instead of through the proxy
        #[arg(long)]
        direct: bool,
    },
    /// List provinces
    Provinces,
    /// List regencies (kabupaten/kota) of a province
    Regencies {
        /// Province code
        code: String,
    },
    /// List districts (kecamatan) of a regency
    Districts {
        /// Regency code
        code: String,
    },
    /// Search subsidized listings
    Search(SearchArgs),
    /// Detect the region for a position
    DetectRegion(DetectArgs),
}

#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Region code (kodeWilayah) to search in
    #[arg(long)]
    pub region: Option<String>,
    /// Province name
    #[arg(long)]
    pub provinsi: Option<String>,
    /// Regency name
    #[arg(long)]
    pub kabupaten: Option<String>,
    /// District name
    #[arg(long)]
    pub kecamatan: Option<String>,
    /// Minimum price of the subsidized house type
    #[arg(long)]
    pub min_price: Option<u64>,
    /// Maximum price of the subsidized house type
    #[arg(long)]
    pub max_price: Option<u64>,
    /// Minimum number of units
    #[arg(long)]
    pub min_units: Option<u32>,
    /// Result page
    #[arg(long, default_value_t = 1)]
    pub page: u32,
}

impl SearchArgs {
    pub fn filter(&self) -> ListingFilter {
        ListingFilter {
            provinsi: self.provinsi.clone(),
            kabupaten: self.kabupaten.clone(),
            kecamatan: self.kecamatan.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            min_units: self.min_units,
        }
    }
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,
    /// Longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,
    /// Forget the remembered region before detecting
    #[arg(long)]
    pub reset: bool,
    /// File remembering the last detected region
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,
}
