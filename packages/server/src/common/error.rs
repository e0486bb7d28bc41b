//! API error taxonomy and the single response envelope.
//!
//! Every handler returns `Result<_, ApiError>`; the `IntoResponse` impl here
//! is the only place response envelopes are produced. Validation stops at the
//! first failure, so an `ApiError` always carries exactly one message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad input shape or format (400).
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation: duplicate email, already-linked number (400).
    #[error("{0}")]
    Conflict(String),

    /// Missing or owned by a different user; the two are deliberately
    /// indistinguishable (404).
    #[error("{0}")]
    NotFound(String),

    /// Missing, malformed or expired token (401).
    #[error("{detail}")]
    Authentication { detail: String, code: String },

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Field-qualified validation message: `"<field>, <reason>"`, lowercased.
    pub fn field_validation(field: &str, reason: &str) -> Self {
        ApiError::Validation(format!("{field}, {reason}").to_lowercase())
    }

    /// Field-qualified conflict message, same shape as validation.
    pub fn field_conflict(field: &str, reason: &str) -> Self {
        ApiError::Conflict(format!("{field}, {reason}").to_lowercase())
    }

    /// Request-level validation message, reported verbatim.
    pub fn request_validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn unauthenticated() -> Self {
        ApiError::Authentication {
            detail: "Authentication credentials were not provided.".to_string(),
            code: "not_authenticated".to_string(),
        }
    }

    pub fn invalid_token() -> Self {
        ApiError::Authentication {
            detail: "Token is invalid or expired".to_string(),
            code: "token_not_valid".to_string(),
        }
    }
}

/// True when the database rejected a write for violating a unique constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(message) | ApiError::Conflict(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
            }
            ApiError::Authentication { detail, code } => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": detail, "code": code })),
            )
                .into_response(),
            ApiError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                internal_response()
            }
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                internal_response()
            }
        }
    }
}

fn internal_response() -> Response {
    // Transient store failures surface as a generic 5xx; details stay in logs.
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "An unknown error occurred" })),
    )
        .into_response()
}
