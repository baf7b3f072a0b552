//! Clients for the two services the proxy forwards to.
//!
//! - [`pkp::PkpClient`]: NIK eligibility lookup, answers with raw HTML.
//! - [`sikumbang::SikumbangClient`]: listing-detail page with embedded JSON data.
//!
//! Both send browser-like headers, make a single attempt with their own timeout
//! and classify failures into the shared [`Error`](rumahsubsidi_core::Error) taxonomy.

pub mod pkp;
pub mod sikumbang;

pub use pkp::PkpClient;
pub use sikumbang::SikumbangClient;

use std::fmt;

/// `Accept` header sent to HTML upstreams.
pub const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Upstream service a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Pkp,
    Sikumbang,
}

impl Upstream {
    pub fn name(&self) -> &'static str {
        match self {
            Upstream::Pkp => "PKP API",
            Upstream::Sikumbang => "Sikumbang",
        }
    }

    /// Error label used when the upstream gave no response.
    pub fn no_response_label(&self) -> String {
        format!("No response from {}", self.name())
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
