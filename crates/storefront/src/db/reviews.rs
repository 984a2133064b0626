//! Product reviews.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use marigold_core::{Email, ProductId, ReviewId};

use super::RepositoryError;

/// A customer review of a product.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    /// Author email. Returned as-is; the storefront UI decides how much of
    /// it to show.
    pub user_email: String,
    /// Star rating, 1-5.
    pub rating: i16,
    pub title: Option<String>,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when posting a review.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ReviewInput {
    pub rating: i16,
    pub title: Option<String>,
    pub comment: String,
}

/// Repository for reviews.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM reviews WHERE product_id = $1 ORDER BY created_at DESC",
        )
        .bind(product_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(review_from_row).collect()
    }

    /// Post a review. One review per customer per product; posting again
    /// replaces the earlier one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        product_id: ProductId,
        email: &Email,
        input: &ReviewInput,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query(
            r"
            INSERT INTO reviews (product_id, user_email, rating, title, comment)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (product_id, user_email)
            DO UPDATE SET rating = EXCLUDED.rating,
                          title = EXCLUDED.title,
                          comment = EXCLUDED.comment,
                          created_at = now()
            RETURNING *
            ",
        )
        .bind(product_id.as_i32())
        .bind(email.as_str())
        .bind(input.rating)
        .bind(input.title.as_deref())
        .bind(&input.comment)
        .fetch_one(self.pool)
        .await?;

        review_from_row(&row)
    }

    /// Delete a review the customer authored.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ReviewId, email: &Email) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND user_email = $2")
            .bind(id.as_i32())
            .bind(email.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn review_from_row(row: &PgRow) -> Result<Review, RepositoryError> {
    Ok(Review {
        id: ReviewId::new(row.try_get("id")?),
        product_id: ProductId::new(row.try_get("product_id")?),
        user_email: row.try_get("user_email")?,
        rating: row.try_get("rating")?,
        title: row.try_get("title")?,
        comment: row.try_get("comment")?,
        created_at: row.try_get("created_at")?,
    })
}
