//! Public marketing content handlers.
//!
//! Served from the in-memory cache; see `db::content` for the TTL.

use axum::{Json, extract::State};
use serde::Serialize;

use marigold_core::{BannerMessage, HeroSlide};

use crate::error::Result;
use crate::state::AppState;

/// Response for `GET /content/hero-slides`.
#[derive(Debug, Serialize)]
pub struct HeroSlidesResponse {
    pub slides: Vec<HeroSlide>,
}

/// Response for `GET /content/banner-messages`.
#[derive(Debug, Serialize)]
pub struct BannerMessagesResponse {
    pub messages: Vec<BannerMessage>,
}

/// Active hero slides in display order.
///
/// GET /content/hero-slides
///
/// # Errors
///
/// 500 on persistence failures.
pub async fn hero_slides(State(state): State<AppState>) -> Result<Json<HeroSlidesResponse>> {
    let slides = state.content().hero_slides(state.pool()).await?;

    Ok(Json(HeroSlidesResponse {
        slides: slides.as_ref().clone(),
    }))
}

/// Active banner messages in display order.
///
/// GET /content/banner-messages
///
/// # Errors
///
/// 500 on persistence failures.
pub async fn banner_messages(
    State(state): State<AppState>,
) -> Result<Json<BannerMessagesResponse>> {
    let messages = state.content().banner_messages(state.pool()).await?;

    Ok(Json(BannerMessagesResponse {
        messages: messages.as_ref().clone(),
    }))
}
