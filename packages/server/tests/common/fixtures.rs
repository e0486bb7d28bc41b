//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly to create test data.

use anyhow::Result;
use sqlx::PgPool;

use server_core::common::{ContactId, UserId};
use server_core::domains::auth::models::User;
use server_core::domains::auth::{JwtService, TokenPair};
use server_core::domains::contacts::models::{Contact, NewContact};

/// A password that satisfies every strength rule.
pub const STRONG_PASSWORD: &str = "StrongPass@123";

/// Create an account and issue a token pair for it, bypassing the login
/// endpoint. Most contact tests only need a valid bearer token.
pub async fn create_test_user(
    pool: &PgPool,
    jwt_service: &JwtService,
    email: &str,
) -> Result<(UserId, TokenPair)> {
    let user = User::register(email, STRONG_PASSWORD, pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to register test user: {e}"))?;
    let tokens = jwt_service.issue_pair(user.id, &user.email)?;
    Ok((user.id, tokens))
}

/// Create a contact with the given telephone numbers.
pub async fn create_test_contact(
    pool: &PgPool,
    user_id: UserId,
    name: &str,
    numbers: &[&str],
) -> Result<ContactId> {
    let (contact, _) = Contact::create(
        user_id,
        NewContact {
            name: name.to_string(),
            address_line_1: None,
            address_line_2: None,
            city: None,
            country: None,
            postcode: None,
            telephones: numbers.iter().map(|n| (*n).to_string()).collect(),
        },
        pool,
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create test contact: {e}"))?;

    Ok(contact.id)
}
