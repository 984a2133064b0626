//! Catalog writes for the admin back-office.
//!
//! Inputs may arrive with colors/badges in any historical shape; they are
//! normalized to the canonical structured form before the row is written,
//! so every document this binary touches is upgraded in place.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use marigold_core::{BadgeField, ColorField, Money, Product, ProductId};

use super::RepositoryError;

/// Fields accepted when creating or replacing a product.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: Money,
    #[serde(default)]
    pub discount_percent: Option<u8>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Accepted in any historical shape; normalized before storage.
    #[serde(default = "empty_colors")]
    pub colors: ColorField,
    #[serde(default = "empty_badges")]
    pub badges: BadgeField,
    #[serde(default)]
    pub specifications: serde_json::Map<String, serde_json::Value>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

fn empty_colors() -> ColorField {
    ColorField::Structured(Vec::new())
}

fn empty_badges() -> BadgeField {
    BadgeField::Structured(Vec::new())
}

const fn default_in_stock() -> bool {
    true
}

/// Repository for catalog administration.
pub struct AdminProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminProductRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query or decode failure.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY created_at DESC")
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(product_from_row).collect()
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query or decode failure.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query or encode failure.
    pub async fn create(&self, input: ProductInput) -> Result<Product, RepositoryError> {
        let encoded = EncodedInput::try_from(input)?;

        let row = sqlx::query(
            r"
            INSERT INTO products (
                name, description, category, price, discount_percent,
                images, sizes, colors, badges, specifications, in_stock
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            ",
        )
        .bind(&encoded.name)
        .bind(&encoded.description)
        .bind(&encoded.category)
        .bind(encoded.price.amount())
        .bind(encoded.discount_percent)
        .bind(&encoded.images)
        .bind(&encoded.sizes)
        .bind(&encoded.colors)
        .bind(&encoded.badges)
        .bind(&encoded.specifications)
        .bind(encoded.in_stock)
        .fetch_one(self.pool)
        .await?;

        product_from_row(&row)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: ProductInput,
    ) -> Result<Product, RepositoryError> {
        let encoded = EncodedInput::try_from(input)?;

        let row = sqlx::query(
            r"
            UPDATE products
            SET name = $2, description = $3, category = $4, price = $5,
                discount_percent = $6, images = $7, sizes = $8, colors = $9,
                badges = $10, specifications = $11, in_stock = $12,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id.as_i32())
        .bind(&encoded.name)
        .bind(&encoded.description)
        .bind(&encoded.category)
        .bind(encoded.price.amount())
        .bind(encoded.discount_percent)
        .bind(&encoded.images)
        .bind(&encoded.sizes)
        .bind(&encoded.colors)
        .bind(&encoded.badges)
        .bind(&encoded.specifications)
        .bind(encoded.in_stock)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        product_from_row(&row)
    }

    /// Delete a product.
    ///
    /// Past orders are unaffected - their line items are frozen snapshots.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// A product input with every JSON field pre-encoded and colors/badges
/// normalized to the canonical shape.
struct EncodedInput {
    name: String,
    description: String,
    category: String,
    price: Money,
    discount_percent: Option<i16>,
    images: serde_json::Value,
    sizes: serde_json::Value,
    colors: serde_json::Value,
    badges: serde_json::Value,
    specifications: serde_json::Value,
    in_stock: bool,
}

impl TryFrom<ProductInput> for EncodedInput {
    type Error = RepositoryError;

    fn try_from(input: ProductInput) -> Result<Self, Self::Error> {
        // Normalization happens here, at the write boundary.
        let colors = input.colors.normalize();
        let badges = input.badges.normalize();

        Ok(Self {
            name: input.name,
            description: input.description,
            category: input.category,
            price: input.price,
            discount_percent: input.discount_percent.map(i16::from),
            images: to_json(&input.images, "images")?,
            sizes: to_json(&input.sizes, "sizes")?,
            colors: to_json(&colors, "colors")?,
            badges: to_json(&badges, "badges")?,
            specifications: serde_json::Value::Object(input.specifications),
            in_stock: input.in_stock,
        })
    }
}

fn to_json<T: serde::Serialize>(
    value: &T,
    field: &str,
) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("failed to encode {field}: {e}")))
}

fn product_from_row(row: &PgRow) -> Result<Product, RepositoryError> {
    let corrupt = |field: &str, e: &dyn std::fmt::Display| {
        RepositoryError::DataCorruption(format!("invalid {field} in database: {e}"))
    };

    let colors: ColorField = serde_json::from_value(row.try_get("colors")?)
        .map_err(|e| corrupt("colors", &e))?;
    let badges: BadgeField = serde_json::from_value(row.try_get("badges")?)
        .map_err(|e| corrupt("badges", &e))?;

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
        images: serde_json::from_value(row.try_get("images")?)
            .map_err(|e| corrupt("images", &e))?,
        sizes: serde_json::from_value(row.try_get("sizes")?).map_err(|e| corrupt("sizes", &e))?,
        colors: colors.normalize(),
        badges: badges.normalize(),
        specifications: serde_json::from_value(row.try_get("specifications")?)
            .map_err(|e| corrupt("specifications", &e))?,
        in_stock: row.try_get("in_stock")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
