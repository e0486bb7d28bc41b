//! Pure validation for submitted telephone numbers.
//!
//! No side effects and no storage access: these functions run before any
//! repository mutation, and a failure here means zero rows are written.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::common::ApiError;

lazy_static! {
    static ref NUMBER_FORMAT: Regex = Regex::new(r"^[0-9+\-() ]+$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelephoneError {
    #[error("Invalid telephone number format. Allowed characters: digits, +, -, (, ), and spaces.")]
    InvalidFormat,

    #[error("Telephone number must be between 7 and 15 characters long.")]
    BadLength,

    #[error("Duplicate telephone numbers are not allowed in the same request.")]
    DuplicateInRequest,

    /// Raised by the repository when a number is already held by another
    /// contact of the same user.
    #[error("The number {0} is already linked to another contact.")]
    AlreadyLinked(String),
}

impl From<TelephoneError> for ApiError {
    fn from(err: TelephoneError) -> Self {
        match err {
            TelephoneError::AlreadyLinked(_) => {
                ApiError::field_conflict("telephones", &err.to_string())
            }
            _ => ApiError::field_validation("telephones", &err.to_string()),
        }
    }
}

/// Check a single submitted number and return its canonical (trimmed) form.
pub fn validate_number(raw: &str) -> Result<String, TelephoneError> {
    let value = raw.trim();
    if value.is_empty() || !NUMBER_FORMAT.is_match(value) {
        return Err(TelephoneError::InvalidFormat);
    }
    let length = value.chars().count();
    if !(7..=15).contains(&length) {
        return Err(TelephoneError::BadLength);
    }
    Ok(value.to_string())
}

/// Validate every number in a request; the same value submitted twice in one
/// request is rejected outright.
pub fn validate_numbers(raw: &[String]) -> Result<Vec<String>, TelephoneError> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(raw.len());
    for value in raw {
        let value = validate_number(value)?;
        if !seen.insert(value.clone()) {
            return Err(TelephoneError::DuplicateInRequest);
        }
        cleaned.push(value);
    }
    Ok(cleaned)
}
