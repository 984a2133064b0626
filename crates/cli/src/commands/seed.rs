//! Seed command: starter catalog and content for a fresh environment.
//!
//! Idempotent-ish: seeding is skipped when the products table already has
//! rows, so running it twice does not duplicate the catalog.

use serde_json::json;

use super::CommandError;

/// Seed the catalog and content tables.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        tracing::info!("Products table already has {existing} rows; skipping seed");
        return Ok(());
    }

    tracing::info!("Seeding catalog...");

    let products = [
        (
            "Linen Camp Shirt",
            "Breathable linen with a relaxed collar.",
            "shirts",
            "49.99",
            json!(["S", "M", "L", "XL"]),
            json!([
                {"name": "Ivory", "value": "#f8f4e9"},
                {"name": "Sage", "value": "#9caf88"}
            ]),
            json!([{"label": "New"}]),
        ),
        (
            "Twill Work Jacket",
            "Heavy cotton twill, triple-stitched seams.",
            "jackets",
            "129.00",
            json!(["M", "L", "XL"]),
            json!([{"name": "Olive", "value": "#556b2f"}]),
            json!([{"label": "Bestseller", "color": "gold"}]),
        ),
        (
            "Everyday Tee",
            "Midweight organic cotton crewneck.",
            "t-shirts",
            "24.00",
            json!(["XS", "S", "M", "L", "XL", "XXL"]),
            json!([
                {"name": "Black", "value": "#1a1a1a"},
                {"name": "White", "value": "#fafafa"},
                {"name": "Navy", "value": "#1f2a44"}
            ]),
            json!([]),
        ),
        (
            "Pleated Midi Skirt",
            "Flowing recycled poly with knife pleats.",
            "skirts",
            "68.50",
            json!(["XS", "S", "M", "L"]),
            json!([{"name": "Rust", "value": "#b7410e"}]),
            json!([{"label": "Limited"}]),
        ),
    ];

    for (name, description, category, price, sizes, colors, badges) in products {
        sqlx::query(
            r"
            INSERT INTO products (name, description, category, price, images, sizes, colors, badges)
            VALUES ($1, $2, $3, $4::numeric, $5, $6, $7, $8)
            ",
        )
        .bind(name)
        .bind(description)
        .bind(category)
        .bind(price)
        .bind(json!([format!(
            "https://images.marigold-apparel.com/{}.jpg",
            name.to_lowercase().replace(' ', "-")
        )]))
        .bind(sizes)
        .bind(colors)
        .bind(badges)
        .execute(&pool)
        .await?;
    }

    tracing::info!("Seeding content...");

    sqlx::query(
        r"
        INSERT INTO hero_slides (headline, subheading, image, cta_link, position)
        VALUES
            ('The Autumn Drop', 'Layers for shorter days', 'https://images.marigold-apparel.com/hero-autumn.jpg', '/products?category=jackets', 0),
            ('Everyday Essentials', 'Tees and shirts, restocked', 'https://images.marigold-apparel.com/hero-essentials.jpg', '/products?category=t-shirts', 1)
        ",
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r"
        INSERT INTO banner_messages (text, link, position)
        VALUES
            ('Free shipping on orders over 999', NULL, 0),
            ('Easy 7-day returns', '/pages/returns', 1)
        ",
    )
    .execute(&pool)
    .await?;

    tracing::info!("Seed complete!");
    Ok(())
}
