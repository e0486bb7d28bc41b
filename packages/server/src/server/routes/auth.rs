//! Registration, login, and refresh token rotation.

use axum::{extract::Extension, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::{ApiError, UserId};
use crate::domains::auth::models::{RevokedToken, User};
use crate::server::app::AppState;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    refresh: Option<String>,
}

fn require_field(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::field_validation(field, "This field is required.")),
    }
}

/// POST /auth/register
pub async fn register_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let email = require_field(body.email, "email")?;
    let password = require_field(body.password, "password")?;

    User::register(&email, &password, &state.db_pool).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

/// POST /auth/login
///
/// Bad credentials are a 400, not a 401: login is itself the
/// unauthenticated step, and this is the documented behavior.
pub async fn login_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = require_field(body.email, "email")?;
    let password = require_field(body.password, "password")?;

    let user = User::find_by_credentials(&email, &password, &state.db_pool).await?;
    let pair = state.jwt_service.issue_pair(user.id, &user.email)?;

    Ok(Json(json!({
        "access_token": pair.access,
        "refresh_token": pair.refresh,
        "email": user.email,
    })))
}

/// POST /auth/refresh
///
/// Rotate-and-blacklist: the presented refresh token's jti is revoked before
/// a new pair is issued, so each refresh token works exactly once. The
/// blacklist insert doubles as the replay check.
pub async fn refresh_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<Value>, ApiError> {
    let token = require_field(body.refresh, "refresh")?;

    let claims = state
        .jwt_service
        .verify_refresh(&token)
        .map_err(|_| ApiError::invalid_token())?;

    let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);
    let fresh = RevokedToken::revoke(claims.jti, expires_at, &state.db_pool).await?;
    if !fresh {
        // Already rotated once; replays are permanently dead.
        return Err(ApiError::invalid_token());
    }

    let pair = state
        .jwt_service
        .issue_pair(UserId::from_uuid(claims.user_id), &claims.email)?;

    Ok(Json(json!({
        "access": pair.access,
        "refresh": pair.refresh,
    })))
}
