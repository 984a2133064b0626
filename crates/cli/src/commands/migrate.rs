//! Database migration command.
//!
//! Migrations live in `crates/storefront/migrations/` (the storefront owns
//! the schema; the admin binary reads the same database) and are embedded
//! into this binary at compile time.

use super::CommandError;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
