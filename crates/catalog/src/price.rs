//! Product price (optional on a product; absent means "price on request").

use serde::{Deserialize, Serialize};

use colourmagic_core::{DomainError, DomainResult, ValueObject};

/// Non-negative price held in the smallest currency unit (paise).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price {
    minor: u64,
}

impl ValueObject for Price {}

/// Largest storable amount in minor units (a signed 64-bit column).
pub const MAX_PRICE_MINOR: u64 = i64::MAX as u64;

impl Price {
    pub fn from_minor(minor: u64) -> Self {
        Self { minor }
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    /// Parse a decimal amount such as `"450"`, `"12.5"` or `"12.50"`.
    ///
    /// At most two fraction digits are accepted; signs, exponents and separators are not.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("price cannot be empty"));
        }

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(DomainError::validation(format!(
                "price must be a non-negative decimal, got {trimmed:?}"
            )));
        }
        if fraction.len() > 2 {
            return Err(DomainError::validation(
                "price cannot have more than two decimal places",
            ));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| DomainError::validation("price is too large"))?
        };
        let fraction: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().unwrap_or(0) * 10,
            _ => fraction.parse::<u64>().unwrap_or(0),
        };

        whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(fraction))
            .filter(|minor| *minor <= MAX_PRICE_MINOR)
            .map(Self::from_minor)
            .ok_or_else(|| DomainError::validation("price is too large"))
    }

    /// Display label used on product pages.
    pub fn label(&self) -> String {
        format!("₹{self}")
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.minor / 100, self.minor % 100)
    }
}
