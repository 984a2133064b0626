//! Server-side cart snapshots.
//!
//! The client keeps its own local cart state and syncs it here with an
//! idempotent `PUT` per mutation; for authenticated customers the server
//! copy is the source of truth, reconciled last-write-wins. Losing a cart
//! is annoying but not financial - the order snapshot, not the cart, is the
//! durable record.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use marigold_core::{Email, Money, ProductId};

use super::RepositoryError;

/// One line in a synced cart.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub unit_price: Money,
    pub size: String,
    pub color: String,
    pub quantity: u32,
}

/// The synced cart for one customer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CartSnapshot {
    pub items: Vec<CartLine>,
    pub updated_at: DateTime<Utc>,
}

/// Repository for cart snapshots.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the customer's synced cart, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query or decode failure.
    pub async fn get(&self, email: &Email) -> Result<Option<CartSnapshot>, RepositoryError> {
        let row = sqlx::query("SELECT items, updated_at FROM carts WHERE user_email = $1")
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items: serde_json::Value = row.try_get("items")?;
        let items = serde_json::from_value(items).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid cart items in database: {e}"))
        })?;

        Ok(Some(CartSnapshot {
            items,
            updated_at: row.try_get("updated_at")?,
        }))
    }

    /// Replace the customer's cart with the given lines (idempotent upsert).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query or encode failure.
    pub async fn put(&self, email: &Email, items: &[CartLine]) -> Result<(), RepositoryError> {
        let items = serde_json::to_value(items).map_err(|e| {
            RepositoryError::DataCorruption(format!("failed to encode cart items: {e}"))
        })?;

        sqlx::query(
            r"
            INSERT INTO carts (user_email, items, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (user_email)
            DO UPDATE SET items = EXCLUDED.items, updated_at = now()
            ",
        )
        .bind(email.as_str())
        .bind(items)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Drop the customer's synced cart (e.g., after checkout).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, email: &Email) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM carts WHERE user_email = $1")
            .bind(email.as_str())
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
