//! Validation error types and field checks

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

/// Maximum length for a phone number (matches `VARCHAR(32)`)
pub const MAX_PHONE_NUMBER_LEN: usize = 32;

/// Digits plus the separators people actually type into listings.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 ()-]*$").expect("invalid phone regex"));

/// Validation error for entity fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Numeric field below its lower bound
    OutOfRange { field: &'static str, value: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::OutOfRange { field, value } => {
                write!(f, "{} must not be negative (got {})", field, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a natural-key name: non-blank and within the column width.
pub fn name(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }

    Ok(())
}

pub fn phone_number(value: &str) -> Result<(), ValidationError> {
    name("phone number", value, MAX_PHONE_NUMBER_LEN)?;

    if !PHONE_RE.is_match(value) {
        return Err(ValidationError::InvalidFormat {
            field: "phone number",
            reason: "must contain digits, spaces, parentheses or dashes, optionally prefixed by '+'",
        });
    }

    Ok(())
}

pub fn non_negative(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
