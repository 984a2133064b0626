//! Database operations for the storefront.
//!
//! # Tables
//!
//! - `orders` - durable order records (JSONB snapshots; never deleted)
//! - `products` - catalog (read-only here; admin owns writes)
//! - `carts` - one server-side cart snapshot per customer email
//! - `user_profiles`, `addresses` - account data keyed by email
//! - `reviews`, `wishlist_items` - per-customer product annotations
//! - `hero_slides`, `banner_messages` - marketing content (read-only here)
//! - `sessions` - tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p marigold-cli -- migrate
//! ```
//!
//! All queries use the runtime-checked sqlx API with explicit binds; row
//! decoding failures surface as [`RepositoryError::DataCorruption`] rather
//! than panics.

pub mod addresses;
pub mod carts;
pub mod content;
pub mod orders;
pub mod products;
pub mod profile;
pub mod reviews;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors surfaced by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be decoded into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The targeted row does not exist (or is not visible to the caller).
    #[error("not found")]
    NotFound,

    /// A conditional write lost a race (stale version).
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
