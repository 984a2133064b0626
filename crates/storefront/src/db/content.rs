//! Marketing content reads, with in-memory caching.
//!
//! Hero slides and banner messages change a few times a week but are read
//! on every page load, so active rows are cached via `moka` with a short
//! TTL. The admin binary writes these tables; a stale read window of a few
//! minutes is acceptable.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use marigold_core::{BannerMessage, BannerMessageId, HeroSlide, HeroSlideId};

use super::RepositoryError;

/// Cache TTL for content reads.
const CONTENT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Cached reader for marketing content.
pub struct ContentCache {
    slides: Cache<(), Arc<Vec<HeroSlide>>>,
    banners: Cache<(), Arc<Vec<BannerMessage>>>,
}

impl ContentCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slides: Cache::builder()
                .max_capacity(1)
                .time_to_live(CONTENT_CACHE_TTL)
                .build(),
            banners: Cache::builder()
                .max_capacity(1)
                .time_to_live(CONTENT_CACHE_TTL)
                .build(),
        }
    }

    /// Active hero slides in display order, cached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query or decode failure.
    pub async fn hero_slides(
        &self,
        pool: &PgPool,
    ) -> Result<Arc<Vec<HeroSlide>>, RepositoryError> {
        if let Some(slides) = self.slides.get(&()).await {
            return Ok(slides);
        }

        let rows = sqlx::query(
            "SELECT * FROM hero_slides WHERE active = TRUE ORDER BY position ASC",
        )
        .fetch_all(pool)
        .await?;

        let slides = Arc::new(
            rows.iter()
                .map(hero_slide_from_row)
                .collect::<Result<Vec<_>, _>>()?,
        );
        self.slides.insert((), Arc::clone(&slides)).await;

        Ok(slides)
    }

    /// Active banner messages in display order, cached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query or decode failure.
    pub async fn banner_messages(
        &self,
        pool: &PgPool,
    ) -> Result<Arc<Vec<BannerMessage>>, RepositoryError> {
        if let Some(banners) = self.banners.get(&()).await {
            return Ok(banners);
        }

        let rows = sqlx::query(
            "SELECT * FROM banner_messages WHERE active = TRUE ORDER BY position ASC",
        )
        .fetch_all(pool)
        .await?;

        let banners = Arc::new(
            rows.iter()
                .map(banner_message_from_row)
                .collect::<Result<Vec<_>, _>>()?,
        );
        self.banners.insert((), Arc::clone(&banners)).await;

        Ok(banners)
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn hero_slide_from_row(row: &PgRow) -> Result<HeroSlide, RepositoryError> {
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

pub(crate) fn banner_message_from_row(row: &PgRow) -> Result<BannerMessage, RepositoryError> {
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
