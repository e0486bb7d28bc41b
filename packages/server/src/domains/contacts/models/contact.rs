//! Contact model - SQL persistence layer.
//!
//! Every multi-row write (create with telephones, additive update, delete
//! cascade) runs inside one transaction; a validation or conflict failure
//! rolls the whole operation back, so partial writes cannot happen.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::error::is_unique_violation;
use crate::common::pagination::Page;
use crate::common::{ApiError, ContactId, UserId};
use crate::domains::contacts::validation::TelephoneError;

use super::telephone::Telephone;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Contact {
    pub id: ContactId,
    pub user_id: UserId,
    pub name: String,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a contact. `telephones` must already have
/// passed `validation::validate_numbers`.
#[derive(Debug, Clone, Default)]
pub struct NewContact {
    pub name: String,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
    pub telephones: Vec<String>,
}

/// Partial update. `None` leaves the stored value untouched; telephones, when
/// present, are validated numbers to append (existing ones are never removed).
#[derive(Debug, Clone, Default)]
pub struct ContactChanges {
    pub name: Option<String>,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
    pub telephones: Option<Vec<String>>,
}

/// Build a `%…%` ILIKE pattern that matches the query literally.
pub fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

const SEARCH_PREDICATE: &str = r"c.user_id = $1
          AND (c.name ILIKE $2 ESCAPE '\'
           OR EXISTS (
                  SELECT 1 FROM telephones t
                  WHERE t.contact_id = c.id AND t.number ILIKE $2 ESCAPE '\'
              ))";

impl Contact {
    pub async fn count_for_user(user_id: UserId, pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM contacts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// One page of the user's contacts, most recent first. The v7 id breaks
    /// ties between rows created in the same microsecond.
    pub async fn list_for_user(
        user_id: UserId,
        page: Page,
        pool: &PgPool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM contacts
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await
    }

    /// Create a contact and one telephone row per submitted number, all or
    /// nothing. The cross-contact duplicate check spans the user's entire
    /// contact set; a concurrent racer slipping past it is caught by the
    /// unique constraint and surfaces as the same conflict.
    pub async fn create(
        user_id: UserId,
        input: NewContact,
        pool: &PgPool,
    ) -> Result<(Self, Vec<Telephone>), ApiError> {
        let mut tx = pool.begin().await?;

        let linked = Telephone::find_linked(user_id, &input.telephones, &mut *tx).await?;
        if let Some(existing) = linked.first() {
            return Err(TelephoneError::AlreadyLinked(existing.number.clone()).into());
        }

        let contact = sqlx::query_as::<_, Self>(
            "INSERT INTO contacts (id, user_id, name, address_line_1, address_line_2, city, country, postcode)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(ContactId::new())
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.address_line_1)
        .bind(&input.address_line_2)
        .bind(&input.city)
        .bind(&input.country)
        .bind(&input.postcode)
        .fetch_one(&mut *tx)
        .await?;

        let mut telephones = Vec::with_capacity(input.telephones.len());
        for number in &input.telephones {
            let telephone = Telephone::insert(user_id, contact.id, number, &mut *tx)
                .await
                .map_err(|err| map_number_conflict(err, number))?;
            telephones.push(telephone);
        }

        tx.commit().await?;
        Ok((contact, telephones))
    }

    /// Partially update a contact owned by `user_id`.
    ///
    /// Returns `None` when the id does not exist or belongs to someone else;
    /// the caller cannot tell which. Telephones are additive: a number
    /// already on this contact is an idempotent no-op, a number on another
    /// contact of the same user is a conflict, anything else is appended.
    pub async fn update(
        user_id: UserId,
        contact_id: ContactId,
        changes: ContactChanges,
        pool: &PgPool,
    ) -> Result<Option<(Self, Vec<Telephone>)>, ApiError> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query_as::<_, Self>(
            "UPDATE contacts SET
                 name = COALESCE($3, name),
                 address_line_1 = COALESCE($4, address_line_1),
                 address_line_2 = COALESCE($5, address_line_2),
                 city = COALESCE($6, city),
                 country = COALESCE($7, country),
                 postcode = COALESCE($8, postcode)
             WHERE id = $1 AND user_id = $2
             RETURNING *",
        )
        .bind(contact_id)
        .bind(user_id)
        .bind(&changes.name)
        .bind(&changes.address_line_1)
        .bind(&changes.address_line_2)
        .bind(&changes.city)
        .bind(&changes.country)
        .bind(&changes.postcode)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(contact) = updated else {
            return Ok(None);
        };

        if let Some(numbers) = &changes.telephones {
            let linked = Telephone::find_linked(user_id, numbers, &mut *tx).await?;
            if let Some(other) = linked.iter().find(|t| t.contact_id != contact.id) {
                return Err(TelephoneError::AlreadyLinked(other.number.clone()).into());
            }

            let already_here: std::collections::HashSet<&str> =
                linked.iter().map(|t| t.number.as_str()).collect();
            for number in numbers {
                if already_here.contains(number.as_str()) {
                    continue;
                }
                Telephone::insert(user_id, contact.id, number, &mut *tx)
                    .await
                    .map_err(|err| map_number_conflict(err, number))?;
            }
        }

        let telephones = Telephone::for_contact(contact.id, &mut *tx).await?;
        tx.commit().await?;
        Ok(Some((contact, telephones)))
    }

    /// Delete a contact owned by `user_id` together with all its telephones.
    ///
    /// The cascade is explicit: telephones first, then the contact, in one
    /// transaction. Returns false for a missing or foreign id (the telephone
    /// delete is owner-scoped too, so a foreign id touches nothing).
    pub async fn delete(
        user_id: UserId,
        contact_id: ContactId,
        pool: &PgPool,
    ) -> Result<bool, ApiError> {
        let mut tx = pool.begin().await?;

        Telephone::delete_for_contact(contact_id, user_id, &mut *tx).await?;

        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND user_id = $2")
            .bind(contact_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    /// How many of the user's contacts match the search query (name or any
    /// telephone number, case-insensitive substring).
    pub async fn search_count(
        user_id: UserId,
        pattern: &str,
        pool: &PgPool,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM contacts c WHERE {SEARCH_PREDICATE}"
        ))
        .bind(user_id)
        .bind(pattern)
        .fetch_one(pool)
        .await
    }

    /// One page of matching contacts. A contact matching through several
    /// telephones still appears once: the telephone match is an EXISTS
    /// predicate, not a join.
    pub async fn search_for_user(
        user_id: UserId,
        pattern: &str,
        page: Page,
        pool: &PgPool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT c.* FROM contacts c
             WHERE {SEARCH_PREDICATE}
             ORDER BY c.created_at DESC, c.id DESC
             LIMIT $3 OFFSET $4"
        ))
        .bind(user_id)
        .bind(pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await
    }
}

fn map_number_conflict(err: sqlx::Error, number: &str) -> ApiError {
    if is_unique_violation(&err) {
        TelephoneError::AlreadyLinked(number.to_string()).into()
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_query() {
        assert_eq!(like_pattern("john"), "%john%");
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern(r"back\slash"), r"%back\\slash%");
    }
}
