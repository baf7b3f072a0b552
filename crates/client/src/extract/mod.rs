//! Data extraction from upstream HTML pages.
//!
//! ### Embedded JSON
//! - Listing-detail pages carry their data as `window.SIKUMBANG_DATA = {...};`.
//! - The assignment is located with a regex, then the object literal is cut out with a
//!   brace-matching scanner that understands JSON strings and escapes, so `;` or `}`
//!   inside a string never truncate the object.
//! - Marker absent (or not followed by `{`): `Error::ExtractFailed`.
//! - Object never closes or is not valid JSON: `Error::Parse`.
//!
//! ### Eligibility table
//! - See [`table`].

pub mod table;

pub use table::parse_eligibility_page;

use regex::Regex;
use rumahsubsidi_core::Error;
use serde_json::Value;

/// Default global the listing-detail page assigns its data to.
pub const DEFAULT_DATA_GLOBAL: &str = "window.SIKUMBANG_DATA";

/// Extractor for a JSON object assigned to a page global.
#[derive(Debug, Clone)]
pub struct EmbeddedJson {
    global: String,
    marker: Regex,
}

impl EmbeddedJson {
    /// Create an extractor for `global` (e.g. `window.SIKUMBANG_DATA`).
    pub fn new(global: &str) -> Result<Self, Error> {
        let global = global.trim();
        if global.is_empty() {
            return Err(Error::InvalidInput("data global must not be empty".into()));
        }

        let pattern = format!(r"{}\s*=\s*", regex::escape(global));
        let marker = Regex::new(&pattern).map_err(|e| Error::Internal(format!("invalid marker pattern: {e}")))?;

        Ok(Self { global: global.to_string(), marker })
    }

    pub fn global(&self) -> &str {
        &self.global
    }

    /// Extract the object assigned to the global.
    ///
    /// The first assignment followed by `{` wins.
    pub fn extract(&self, html: &str) -> Result<Value, Error> {
        let start = self
            .marker
            .find_iter(html)
            .map(|m| m.end())
            .find(|&end| html[end..].starts_with('{'))
            .ok_or_else(|| Error::ExtractFailed(format!("{} not found in page", self.global)))?;

        let object = balanced_object(&html[start..])
            .ok_or_else(|| Error::Parse(format!("{} object is never closed", self.global)))?;

        let value: Value = serde_json::from_str(object)
            .map_err(|e| Error::Parse(format!("{} is not valid JSON: {e}", self.global)))?;

        tracing::debug!(global = %self.global, bytes = object.len(), "extracted embedded data");

        Ok(value)
    }
}

impl Default for EmbeddedJson {
    fn default() -> Self {
        let global = DEFAULT_DATA_GLOBAL.to_string();
        let marker = Regex::new(r"window\.SIKUMBANG_DATA\s*=\s*").expect("invalid marker pattern");
        Self { global, marker }
    }
}

/// Cut the balanced `{...}` object at the start of `input`.
///
/// Braces inside JSON strings are ignored, and `\"` does not end a string.
/// Returns `None` when `input` does not start with `{` or the object never closes.
pub fn balanced_object(input: &str) -> Option<&str> {
    if !input.starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, byte) in input.bytes().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&input[..=idx]);
                }
            }
            _ => {}
        }
    }

    None
}
