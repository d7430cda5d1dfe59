//! Bounded Text Value Objects
//!
//! Required free-text profile fields with an upper length bound.
//! Input is trimmed and NFC normalized; the bound counts characters, not bytes.

use derive_more::Display;
use serde::Serialize;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Bound for name-like profile fields
pub const PROFILE_TEXT_MAX_LENGTH: usize = 255;

/// Bound for telephone fields
pub const TELEPHONE_MAX_LENGTH: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoundedTextError {
    #[error("Value cannot be empty")]
    Empty,
    #[error("Value must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },
}

/// Non-empty text of at most `MAX` characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(transparent)]
pub struct BoundedText<const MAX: usize>(String);

/// First/middle/last name and username
pub type ProfileText = BoundedText<PROFILE_TEXT_MAX_LENGTH>;

/// Landline and mobile numbers
pub type Telephone = BoundedText<TELEPHONE_MAX_LENGTH>;

impl<const MAX: usize> BoundedText<MAX> {
    pub const MAX_LENGTH: usize = MAX;

    pub fn new(input: impl AsRef<str>) -> Result<Self, BoundedTextError> {
        let normalized: String = input.as_ref().trim().nfc().collect();

        if normalized.is_empty() {
            return Err(BoundedTextError::Empty);
        }

        let actual = normalized.chars().count();
        if actual > MAX {
            return Err(BoundedTextError::TooLong { max: MAX, actual });
        }

        Ok(Self(normalized))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<const MAX: usize> AsRef<str> for BoundedText<MAX> {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
