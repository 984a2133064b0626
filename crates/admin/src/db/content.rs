//! Marketing content administration: hero slides and banner messages.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use marigold_core::{BannerMessage, BannerMessageId, HeroSlide, HeroSlideId};

use super::RepositoryError;

/// Fields accepted when creating or replacing a hero slide.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct HeroSlideInput {
    pub headline: String,
    #[serde(default)]
    pub subheading: Option<String>,
    pub image: String,
    #[serde(default)]
    pub cta_link: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Fields accepted when creating or replacing a banner message.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct BannerMessageInput {
    pub text: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// Repository for content administration.
pub struct AdminContentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminContentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // -------------------------------------------------------------------------
    // Hero slides
    // -------------------------------------------------------------------------

    /// All hero slides (active and inactive) in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_hero_slides(&self) -> Result<Vec<HeroSlide>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM hero_slides ORDER BY position ASC, id ASC")
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(hero_slide_from_row).collect()
    }

    /// Create a hero slide.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_hero_slide(
        &self,
        input: &HeroSlideInput,
    ) -> Result<HeroSlide, RepositoryError> {
        let row = sqlx::query(
            r"
            INSERT INTO hero_slides (headline, subheading, image, cta_link, position, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(&input.headline)
        .bind(input.subheading.as_deref())
        .bind(&input.image)
        .bind(input.cta_link.as_deref())
        .bind(input.position)
        .bind(input.active)
        .fetch_one(self.pool)
        .await?;

        hero_slide_from_row(&row)
    }

    /// Replace a hero slide's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the slide does not exist.
    pub async fn update_hero_slide(
        &self,
        id: HeroSlideId,
        input: &HeroSlideInput,
    ) -> Result<HeroSlide, RepositoryError> {
        let row = sqlx::query(
            r"
            UPDATE hero_slides
            SET headline = $2, subheading = $3, image = $4, cta_link = $5,
                position = $6, active = $7, updated_at = now()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id.as_i32())
        .bind(&input.headline)
        .bind(input.subheading.as_deref())
        .bind(&input.image)
        .bind(input.cta_link.as_deref())
        .bind(input.position)
        .bind(input.active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        hero_slide_from_row(&row)
    }

    /// Delete a hero slide. Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_hero_slide(&self, id: HeroSlideId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM hero_slides WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Banner messages
    // -------------------------------------------------------------------------

    /// All banner messages (active and inactive) in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_banner_messages(&self) -> Result<Vec<BannerMessage>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM banner_messages ORDER BY position ASC, id ASC")
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(banner_message_from_row).collect()
    }

    /// Create a banner message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_banner_message(
        &self,
        input: &BannerMessageInput,
    ) -> Result<BannerMessage, RepositoryError> {
        let row = sqlx::query(
            r"
            INSERT INTO banner_messages (text, link, position, active)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(&input.text)
        .bind(input.link.as_deref())
        .bind(input.position)
        .bind(input.active)
        .fetch_one(self.pool)
        .await?;

        banner_message_from_row(&row)
    }

    /// Replace a banner message's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message does not exist.
    pub async fn update_banner_message(
        &self,
        id: BannerMessageId,
        input: &BannerMessageInput,
    ) -> Result<BannerMessage, RepositoryError> {
        let row = sqlx::query(
            r"
            UPDATE banner_messages
            SET text = $2, link = $3, position = $4, active = $5, updated_at = now()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id.as_i32())
        .bind(&input.text)
        .bind(input.link.as_deref())
        .bind(input.position)
        .bind(input.active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        banner_message_from_row(&row)
    }

    /// Delete a banner message. Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_banner_message(
        &self,
        id: BannerMessageId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM banner_messages WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn hero_slide_from_row(row: &PgRow) -> Result<HeroSlide, RepositoryError> {
    Ok(HeroSlide {
        id: HeroSlideId::new(row.try_get("id")?),
        headline: row.try_get("headline")?,
        subheading: row.try_get("subheading")?,
        image: row.try_get("image")?,
        cta_link: row.try_get("cta_link")?,
        position: row.try_get("position")?,
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn banner_message_from_row(row: &PgRow) -> Result<BannerMessage, RepositoryError> {
    Ok(BannerMessage {
        id: BannerMessageId::new(row.try_get("id")?),
        text: row.try_get("text")?,
        link: row.try_get("link")?,
        position: row.try_get("position")?,
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
