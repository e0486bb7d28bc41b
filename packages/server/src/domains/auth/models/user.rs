//! User account model - SQL persistence layer.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;

use crate::common::error::is_unique_violation;
use crate::common::{ApiError, UserId};
use crate::domains::auth::password::{hash_password, validate_password, verify_password};

lazy_static! {
    static ref EMAIL_FORMAT: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Normalized form used for storage and lookup: trimmed and lowercased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create an account: normalize the email, apply the password policy,
    /// hash, insert. A second registration under the same normalized email
    /// surfaces the unique constraint as a conflict.
    pub async fn register(email: &str, raw_password: &str, pool: &PgPool) -> Result<Self, ApiError> {
        let email = normalize_email(email);
        if !EMAIL_FORMAT.is_match(&email) {
            return Err(ApiError::field_validation(
                "email",
                "Enter a valid email address.",
            ));
        }
        if let Err(rule) = validate_password(raw_password) {
            return Err(ApiError::field_validation("password", rule.message()));
        }

        let password_hash = hash_password(raw_password)?;

        let inserted = sqlx::query_as::<_, Self>(
            "INSERT INTO users (id, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(UserId::new())
        .bind(&email)
        .bind(&password_hash)
        .fetch_one(pool)
        .await;

        match inserted {
            Ok(user) => Ok(user),
            Err(err) if is_unique_violation(&err) => Err(ApiError::field_conflict(
                "email",
                "User with this email already exists.",
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Authenticate an email/password pair.
    ///
    /// Unknown email, wrong password and deactivated accounts all fail with
    /// the same message so responses cannot be used for account enumeration.
    pub async fn find_by_credentials(
        email: &str,
        raw_password: &str,
        pool: &PgPool,
    ) -> Result<Self, ApiError> {
        let email = normalize_email(email);

        let user = sqlx::query_as::<_, Self>("SELECT * FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(pool)
            .await?;

        match user {
            Some(user) if user.is_active && verify_password(raw_password, &user.password_hash) => {
                Ok(user)
            }
            _ => Err(ApiError::request_validation("Invalid email or password")),
        }
    }
}
