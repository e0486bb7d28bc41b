//! Password policy and hashing.
//!
//! The policy is a plain function over the raw password. Rules run in a
//! fixed order and only the first violation is reported. Stored credentials
//! are Argon2id PHC strings with a per-user salt.

use anyhow::{anyhow, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref UPPERCASE: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref LOWERCASE: Regex = Regex::new(r"[a-z]").unwrap();
    static ref DIGIT: Regex = Regex::new(r"\d").unwrap();
    static ref SYMBOL: Regex = Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).unwrap();
}

/// The rule a candidate password failed, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
    Symbol,
}

impl PasswordRule {
    pub fn message(self) -> &'static str {
        match self {
            PasswordRule::MinLength => "must be at least 8 characters long.",
            PasswordRule::Uppercase => "must contain at least one uppercase letter.",
            PasswordRule::Lowercase => "must contain at least one lowercase letter.",
            PasswordRule::Digit => "must contain at least one digit (0-9).",
            PasswordRule::Symbol => {
                "must contain at least one special character (!@#$%^&*(),.)."
            }
        }
    }
}

/// Check a raw password against the registration policy.
///
/// Rules are evaluated in a fixed order (length, uppercase, lowercase, digit,
/// symbol); the first failing rule is returned alone, never an aggregate.
pub fn validate_password(raw: &str) -> Result<(), PasswordRule> {
    if raw.chars().count() < 8 {
        return Err(PasswordRule::MinLength);
    }
    if !UPPERCASE.is_match(raw) {
        return Err(PasswordRule::Uppercase);
    }
    if !LOWERCASE.is_match(raw) {
        return Err(PasswordRule::Lowercase);
    }
    if !DIGIT.is_match(raw) {
        return Err(PasswordRule::Digit);
    }
    if !SYMBOL.is_match(raw) {
        return Err(PasswordRule::Symbol);
    }
    Ok(())
}

/// Hash a raw password with Argon2id and a fresh random salt.
pub fn hash_password(raw: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("password hashing failed: {err}"))
}

/// Verify a raw password against a stored PHC hash string.
///
/// An unparseable stored hash verifies as false rather than erroring; the
/// caller must not be able to distinguish it from a wrong password.
pub fn verify_password(raw: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(raw.as_bytes(), &parsed)
        .is_ok()
}
