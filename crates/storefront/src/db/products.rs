//! Catalog read access for the storefront.
//!
//! Product rows are written by the admin binary; this repository only reads
//! them. Colors and badges are stored in whatever shape the document
//! originally carried (plain string, JSON-encoded string, string array, or
//! structured array) and are normalized to the canonical structured form
//! here, immediately after load - nothing past this module ever branches on
//! field shape.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, QueryBuilder, Row};

use marigold_core::{BadgeField, ColorField, Money, Product, ProductId};

use super::RepositoryError;

/// Filters for the product listing. All optional; combined with AND.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    /// Case-insensitive substring match over name and description.
    pub search: Option<String>,
}

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching the filter, newest first.
    ///
    /// Returns the page of products plus the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if a stored field cannot be decoded.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let limit = i64::from(limit);
        let offset = i64::from(page.saturating_sub(1)) * limit;

        let mut query = QueryBuilder::new("SELECT * FROM products WHERE TRUE");
        push_filters(&mut query, filter);
        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let rows = query.build().fetch_all(self.pool).await?;
        let products = rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM products WHERE TRUE");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        Ok((products, total))
    }

    /// Fetch a single product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored field cannot be decoded.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(product_from_row).transpose()
    }
}

/// Append the filter's WHERE clauses.
///
/// Size, color, and search match via text containment over the stored JSON,
/// which works across every historical field shape. Listing here is simple
/// filtering, not ranking.
fn push_filters(query: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &ProductFilter) {
    if let Some(category) = &filter.category {
        query.push(" AND category = ");
        query.push_bind(category.clone());
    }
    if let Some(size) = &filter.size {
        query.push(" AND sizes ? ");
        query.push_bind(size.clone());
    }
    if let Some(color) = &filter.color {
        query.push(" AND colors::text ILIKE '%' || ");
        query.push_bind(color.clone());
        query.push(" || '%'");
    }
    if let Some(search) = &filter.search {
        query.push(" AND (name ILIKE '%' || ");
        query.push_bind(search.clone());
        query.push(" || '%' OR description ILIKE '%' || ");
        query.push_bind(search.clone());
        query.push(" || '%')");
    }
}

pub(crate) fn product_from_row(row: &PgRow) -> Result<Product, RepositoryError> {
    let corrupt = |field: &str, e: &dyn std::fmt::Display| {
        RepositoryError::DataCorruption(format!("invalid {field} in database: {e}"))
    };

    let images: serde_json::Value = row.try_get("images")?;
    let sizes: serde_json::Value = row.try_get("sizes")?;
    let colors: serde_json::Value = row.try_get("colors")?;
    let badges: serde_json::Value = row.try_get("badges")?;
    let specifications: serde_json::Value = row.try_get("specifications")?;

    let colors: ColorField =
        serde_json::from_value(colors).map_err(|e| corrupt("colors", &e))?;
    let badges: BadgeField =
        serde_json::from_value(badges).map_err(|e| corrupt("badges", &e))?;

    let discount_percent: Option<i16> = row.try_get("discount_percent")?;
    let discount_percent = discount_percent
        .map(|v| u8::try_from(v).map_err(|e| corrupt("discount_percent", &e)))
        .transpose()?;

    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        price: Money::new(row.try_get("price")?),
        discount_percent,
        images: serde_json::from_value(images).map_err(|e| corrupt("images", &e))?,
        sizes: serde_json::from_value(sizes).map_err(|e| corrupt("sizes", &e))?,
        // Normalized once, here - the rest of the system only sees the
        // canonical structured shapes.
        colors: colors.normalize(),
        badges: badges.normalize(),
        specifications: serde_json::from_value(specifications)
            .map_err(|e| corrupt("specifications", &e))?,
        in_stock: row.try_get("in_stock")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
