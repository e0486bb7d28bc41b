//! Refresh token rotation blacklist.
//!
//! Durable across restarts: every rotated `jti` is persisted, so a replayed
//! refresh token is rejected even by a freshly started process.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub struct RevokedToken;

impl RevokedToken {
    /// Blacklist a refresh token's `jti`.
    ///
    /// Returns false when the `jti` was already present, i.e. the token has
    /// been rotated once before. The insert-or-conflict makes two concurrent
    /// refreshes of the same token race safely: exactly one caller wins.
    pub async fn revoke<'e>(
        jti: Uuid,
        expires_at: DateTime<Utc>,
        executor: impl sqlx::PgExecutor<'e>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO revoked_refresh_tokens (jti, expires_at)
             VALUES ($1, $2)
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(expires_at)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Drop blacklist rows for tokens that have expired on their own.
    pub async fn prune_expired<'e>(
        executor: impl sqlx::PgExecutor<'e>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM revoked_refresh_tokens WHERE expires_at < now()")
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
