//! JWT issuance and verification.
//!
//! Access tokens live for one hour, refresh tokens for seven days. Both carry
//! a `token_type` claim so one kind can never stand in for the other, and a
//! unique `jti` so rotated refresh tokens can be blacklisted individually.

use anyhow::Result;
use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::UserId;

pub const ACCESS_TOKEN_TYPE: &str = "access";
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// JWT claims - data stored in the token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,

    /// Owning account UUID
    pub user_id: Uuid,

    pub email: String,

    /// "access" or "refresh"
    pub token_type: String,

    pub exp: i64,
    pub iat: i64,
    pub iss: String,

    /// Unique token identifier; the rotation blacklist is keyed on this
    pub jti: Uuid,
}

/// A freshly issued access + refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// JWT service - creates and verifies token pairs
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtService {
    /// Create new JWT service with secret and issuer
    pub fn new(secret: &str, issuer: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
        }
    }

    /// Issue a fresh access (1 hour) + refresh (7 days) pair for a user.
    pub fn issue_pair(&self, user_id: UserId, email: &str) -> Result<TokenPair> {
        Ok(TokenPair {
            access: self.issue(user_id, email, ACCESS_TOKEN_TYPE, Duration::hours(1))?,
            refresh: self.issue(user_id, email, REFRESH_TOKEN_TYPE, Duration::days(7))?,
        })
    }

    fn issue(
        &self,
        user_id: UserId,
        email: &str,
        token_type: &str,
        lifetime: Duration,
    ) -> Result<String> {
        let now = chrono::Utc::now();

        let claims = Claims {
            sub: user_id.to_string(),
            user_id: user_id.into_uuid(),
            email: email.to_string(),
            token_type: token_type.to_string(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify an access token (signature, expiry, issuer, token type).
    pub fn verify_access(&self, token: &str) -> Result<Claims> {
        self.verify(token, ACCESS_TOKEN_TYPE)
    }

    /// Verify a refresh token. The rotation blacklist is checked separately
    /// by the caller; this only proves the token itself is genuine.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims> {
        self.verify(token, REFRESH_TOKEN_TYPE)
    }

    fn verify(&self, token: &str, expected_type: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)?.claims;

        if claims.token_type != expected_type {
            anyhow::bail!("expected a {expected_type} token");
        }

        Ok(claims)
    }
}
