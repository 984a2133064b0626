//! Saved shipping addresses, keyed by customer email.
//!
//! Orders copy the chosen address into their own snapshot at creation, so
//! editing or deleting a saved address never rewrites history.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use marigold_core::{AddressId, Email};

use super::RepositoryError;

/// A saved address.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Address {
    pub id: AddressId,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or updating an address.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AddressInput {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Repository for saved addresses.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All addresses for a customer, default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, email: &Email) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT * FROM addresses
            WHERE user_email = $1
            ORDER BY is_default DESC, created_at ASC
            ",
        )
        .bind(email.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(address_from_row).collect()
    }

    /// Create an address. Setting `is_default` clears the previous default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(
        &self,
        email: &Email,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            sqlx::query("UPDATE addresses SET is_default = FALSE WHERE user_email = $1")
                .bind(email.as_str())
                .execute(&mut *tx)
                .await?;
        }

        let row = sqlx::query(
            r"
            INSERT INTO addresses (
                user_email, first_name, last_name, address, city, state,
                zip, country, phone, is_default
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            ",
        )
        .bind(email.as_str())
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.zip)
        .bind(&input.country)
        .bind(&input.phone)
        .bind(input.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        address_from_row(&row)
    }

    /// Update an address owned by the customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist or
    /// belongs to someone else.
    pub async fn update(
        &self,
        id: AddressId,
        email: &Email,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            sqlx::query("UPDATE addresses SET is_default = FALSE WHERE user_email = $1")
                .bind(email.as_str())
                .execute(&mut *tx)
                .await?;
        }

        let row = sqlx::query(
            r"
            UPDATE addresses
            SET first_name = $3, last_name = $4, address = $5, city = $6,
                state = $7, zip = $8, country = $9, phone = $10,
                is_default = $11, updated_at = now()
            WHERE id = $1 AND user_email = $2
            RETURNING *
            ",
        )
        .bind(id.as_i32())
        .bind(email.as_str())
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.zip)
        .bind(&input.country)
        .bind(&input.phone)
        .bind(input.is_default)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;

        address_from_row(&row)
    }

    /// Delete an address owned by the customer.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: AddressId, email: &Email) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_email = $2")
            .bind(id.as_i32())
            .bind(email.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn address_from_row(row: &PgRow) -> Result<Address, RepositoryError> {
    Ok(Address {
        id: AddressId::new(row.try_get("id")?),
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        zip: row.try_get("zip")?,
        country: row.try_get("country")?,
        phone: row.try_get("phone")?,
        is_default: row.try_get("is_default")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
