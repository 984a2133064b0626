//! Marketing content types: hero slides and banner messages.
//!
//! Managed by the admin back-office, served read-only (and cached) by the
//! storefront.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BannerMessageId, HeroSlideId};

/// A slide in the storefront's home-page hero carousel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroSlide {
    pub id: HeroSlideId,
    pub headline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subheading: Option<String>,
    /// Background image URL (externally hosted).
    pub image: String,
    /// Call-to-action link target, e.g. "/products?category=dresses".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_link: Option<String>,
    /// Display order, ascending.
    pub position: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A short announcement shown in the storefront's top banner strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerMessage {
    pub id: BannerMessageId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Display order, ascending.
    pub position: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
