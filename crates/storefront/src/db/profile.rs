//! Customer profile data, keyed by email.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use marigold_core::Email;

use super::RepositoryError;

/// A customer profile. Sparse by design - identity lives with the provider,
/// this is just display and contact preferences.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UserProfile {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when updating a profile.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// Repository for customer profiles.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a profile, if one has been saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, email: &Email) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM user_profiles WHERE user_email = $1")
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    /// Create or update the profile (idempotent upsert).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        email: &Email,
        input: &ProfileInput,
    ) -> Result<UserProfile, RepositoryError> {
        let row = sqlx::query(
            r"
            INSERT INTO user_profiles (user_email, first_name, last_name, phone)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_email)
            DO UPDATE SET first_name = EXCLUDED.first_name,
                          last_name = EXCLUDED.last_name,
                          phone = EXCLUDED.phone,
                          updated_at = now()
            RETURNING *
            ",
        )
        .bind(email.as_str())
        .bind(input.first_name.as_deref())
        .bind(input.last_name.as_deref())
        .bind(input.phone.as_deref())
        .fetch_one(self.pool)
        .await?;

        profile_from_row(&row)
    }
}

fn profile_from_row(row: &PgRow) -> Result<UserProfile, RepositoryError> {
    Ok(UserProfile {
        email: row.try_get("user_email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        phone: row.try_get("phone")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
