//! Currency code value object.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// ISO-4217-style three-letter currency code, stored uppercase.
///
/// Compared by value; construction normalizes case but does not verify the
/// code against a currency registry (the rate table is the authority on
/// which currencies are convertible).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// The reference currency all amounts are normalized through.
    pub const REFERENCE: &'static str = "USD";

    /// Parse a currency code: trimmed, uppercased, exactly three ASCII letters.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        Self::normalize(value).ok_or_else(|| {
            DomainError::validation(format!("invalid currency code: {value:?}"))
        })
    }

    /// Lenient variant of [`CurrencyCode::parse`]: `None` instead of an error.
    pub fn normalize(value: &str) -> Option<Self> {
        let trimmed = value.trim().to_ascii_uppercase();
        if trimmed.len() == 3 && trimmed.bytes().all(|b| b.is_ascii_alphabetic()) {
            Some(Self(trimmed))
        } else {
            None
        }
    }

    pub fn usd() -> Self {
        Self(Self::REFERENCE.to_string())
    }

    pub fn is_reference(&self) -> bool {
        self.0 == Self::REFERENCE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
