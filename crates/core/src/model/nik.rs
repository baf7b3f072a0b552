//! Indonesian national identity number (NIK).

use std::fmt;

use crate::Error;

/// Number of digits in a NIK.
pub const NIK_LEN: usize = 16;

/// Digits left visible when a NIK is printed.
const VISIBLE_DIGITS: usize = 4;

/// A validated 16-digit NIK.
///
/// `Debug` and `Display` print the masked form (`3201************`); use
/// [`Nik::as_str`] to get the full number for an outbound request.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Nik(String);

impl Nik {
    /// Validate raw user input.
    ///
    /// Surrounding whitespace is ignored. Anything other than exactly 16 ASCII
    /// digits is rejected with `Error::InvalidInput`.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(Error::InvalidInput("NIK is required".into()));
        }
        if trimmed.chars().count() != NIK_LEN {
            return Err(Error::InvalidInput("NIK must be 16 digits".into()));
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidInput("NIK must contain digits only".into()));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First four digits followed by `*` for the rest.
    pub fn masked(&self) -> String {
        mask(&self.0)
    }
}

/// Mask an arbitrary identifier the way a NIK is masked in logs.
pub fn mask(raw: &str) -> String {
    let visible: String = raw.chars().take(VISIBLE_DIGITS).collect();
    let hidden = raw.chars().count().saturating_sub(VISIBLE_DIGITS);
    format!("{visible}{}", "*".repeat(hidden))
}

impl fmt::Display for Nik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl fmt::Debug for Nik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Nik").field(&self.masked()).finish()
    }
}
