//! Customer wishlists.

use sqlx::PgPool;

use marigold_core::{Email, Product, ProductId};

use super::RepositoryError;
use super::products::product_from_row;

/// Repository for wishlist entries.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The customer's wishlisted products, most recently added first.
    ///
    /// Products deleted from the catalog silently drop out of the join.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query or decode failure.
    pub async fn list(&self, email: &Email) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT p.* FROM wishlist_items w
            JOIN products p ON p.id = w.product_id
            WHERE w.user_email = $1
            ORDER BY w.created_at DESC
            ",
        )
        .bind(email.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(product_from_row).collect()
    }

    /// Add a product to the wishlist (idempotent).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn add(&self, email: &Email, product_id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO wishlist_items (user_email, product_id)
            SELECT $1, id FROM products WHERE id = $2
            ON CONFLICT (user_email, product_id) DO NOTHING
            ",
        )
        .bind(email.as_str())
        .bind(product_id.as_i32())
        .execute(self.pool)
        .await?;

        // Zero rows and no conflict means the product does not exist.
        if result.rows_affected() == 0 {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM wishlist_items WHERE user_email = $1 AND product_id = $2)",
            )
            .bind(email.as_str())
            .bind(product_id.as_i32())
            .fetch_one(self.pool)
            .await?;

            if !exists {
                return Err(RepositoryError::NotFound);
            }
        }

        Ok(())
    }

    /// Remove a product from the wishlist.
    ///
    /// Returns `true` if an entry was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        email: &Email,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM wishlist_items WHERE user_email = $1 AND product_id = $2")
                .bind(email.as_str())
                .bind(product_id.as_i32())
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
