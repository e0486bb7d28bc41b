//! Telephone model - SQL persistence layer.

use crate::common::{ContactId, TelephoneId, UserId};

/// Telephone row. `user_id` duplicates the parent contact's owner so the
/// per-user `UNIQUE (user_id, number)` constraint can live on this table
/// alone: one user holds a number at most once across their whole contact
/// set, while different users may hold the same number.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Telephone {
    pub id: TelephoneId,
    pub user_id: UserId,
    pub contact_id: ContactId,
    pub number: String,
}

impl Telephone {
    /// Rows the user already holds from the given set of numbers, whichever
    /// contact they hang off. Drives the cross-contact duplicate check.
    pub async fn find_linked<'e>(
        user_id: UserId,
        numbers: &[String],
        executor: impl sqlx::PgExecutor<'e>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM telephones WHERE user_id = $1 AND number = ANY($2)",
        )
        .bind(user_id)
        .bind(numbers)
        .fetch_all(executor)
        .await
    }

    /// All telephones of one contact, oldest first.
    pub async fn for_contact<'e>(
        contact_id: ContactId,
        executor: impl sqlx::PgExecutor<'e>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM telephones WHERE contact_id = $1 ORDER BY id ASC")
            .bind(contact_id)
            .fetch_all(executor)
            .await
    }

    /// Telephones for a whole page of contacts in one round trip.
    pub async fn for_contacts<'e>(
        contact_ids: &[ContactId],
        executor: impl sqlx::PgExecutor<'e>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM telephones WHERE contact_id = ANY($1) ORDER BY id ASC",
        )
        .bind(contact_ids)
        .fetch_all(executor)
        .await
    }

    /// Attach a number to a contact. The caller owns the surrounding
    /// transaction and maps unique-violation failures.
    pub async fn insert<'e>(
        user_id: UserId,
        contact_id: ContactId,
        number: &str,
        executor: impl sqlx::PgExecutor<'e>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO telephones (id, user_id, contact_id, number)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(TelephoneId::new())
        .bind(user_id)
        .bind(contact_id)
        .bind(number)
        .fetch_one(executor)
        .await
    }

    /// Remove every telephone of one contact, owner-scoped. Part of the
    /// explicit contact delete cascade.
    pub async fn delete_for_contact<'e>(
        contact_id: ContactId,
        user_id: UserId,
        executor: impl sqlx::PgExecutor<'e>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM telephones WHERE contact_id = $1 AND user_id = $2")
            .bind(contact_id)
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
