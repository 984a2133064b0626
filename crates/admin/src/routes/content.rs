//! Content administration handlers: hero slides and banner messages.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use marigold_core::{BannerMessage, BannerMessageId, HeroSlide, HeroSlideId};

use crate::db::content::{AdminContentRepository, BannerMessageInput, HeroSlideInput};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Response for `GET /admin/hero-slides`.
#[derive(Debug, Serialize)]
pub struct HeroSlidesResponse {
    pub success: bool,
    pub slides: Vec<HeroSlide>,
}

/// Response for `GET /admin/banner-messages`.
#[derive(Debug, Serialize)]
pub struct BannerMessagesResponse {
    pub success: bool,
    pub messages: Vec<BannerMessage>,
}

/// All hero slides, including inactive ones.
///
/// GET /admin/hero-slides
///
/// # Errors
///
/// 401 for non-admins, 500 on persistence failures.
pub async fn hero_slides(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<HeroSlidesResponse>> {
    let slides = AdminContentRepository::new(state.pool())
        .list_hero_slides()
        .await?;

    Ok(Json(HeroSlidesResponse {
        success: true,
        slides,
    }))
}

/// Create a hero slide.
///
/// POST /admin/hero-slides
///
/// # Errors
///
/// 400 for an invalid payload.
pub async fn create_hero_slide(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<HeroSlideInput>,
) -> Result<(StatusCode, Json<HeroSlide>)> {
    if input.headline.trim().is_empty() {
        return Err(AppError::BadRequest("headline cannot be empty".into()));
    }

    let slide = AdminContentRepository::new(state.pool())
        .create_hero_slide(&input)
        .await?;

    Ok((StatusCode::CREATED, Json(slide)))
}

/// Replace a hero slide.
///
/// PUT /admin/hero-slides/{id}
///
/// # Errors
///
/// 404 if the slide does not exist.
pub async fn update_hero_slide(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(input): Json<HeroSlideInput>,
) -> Result<Json<HeroSlide>> {
    let slide = AdminContentRepository::new(state.pool())
        .update_hero_slide(HeroSlideId::new(id), &input)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound(format!("hero slide {id}"))
            }
            other => other.into(),
        })?;

    Ok(Json(slide))
}

/// Delete a hero slide.
///
/// DELETE /admin/hero-slides/{id}
///
/// # Errors
///
/// 404 if the slide does not exist.
pub async fn delete_hero_slide(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let deleted = AdminContentRepository::new(state.pool())
        .delete_hero_slide(HeroSlideId::new(id))
        .await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("hero slide {id}")))
    }
}

/// All banner messages, including inactive ones.
///
/// GET /admin/banner-messages
///
/// # Errors
///
/// 401 for non-admins, 500 on persistence failures.
pub async fn banner_messages(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<BannerMessagesResponse>> {
    let messages = AdminContentRepository::new(state.pool())
        .list_banner_messages()
        .await?;

    Ok(Json(BannerMessagesResponse {
        success: true,
        messages,
    }))
}

/// Create a banner message.
///
/// POST /admin/banner-messages
///
/// # Errors
///
/// 400 for an invalid payload.
pub async fn create_banner_message(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<BannerMessageInput>,
) -> Result<(StatusCode, Json<BannerMessage>)> {
    if input.text.trim().is_empty() {
        return Err(AppError::BadRequest("text cannot be empty".into()));
    }

    let message = AdminContentRepository::new(state.pool())
        .create_banner_message(&input)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Replace a banner message.
///
/// PUT /admin/banner-messages/{id}
///
/// # Errors
///
/// 404 if the message does not exist.
pub async fn update_banner_message(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(input): Json<BannerMessageInput>,
) -> Result<Json<BannerMessage>> {
    let message = AdminContentRepository::new(state.pool())
        .update_banner_message(BannerMessageId::new(id), &input)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound(format!("banner message {id}"))
            }
            other => other.into(),
        })?;

    Ok(Json(message))
}

/// Delete a banner message.
///
/// DELETE /admin/banner-messages/{id}
///
/// # Errors
///
/// 404 if the message does not exist.
pub async fn delete_banner_message(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let deleted = AdminContentRepository::new(state.pool())
        .delete_banner_message(BannerMessageId::new(id))
        .await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("banner message {id}")))
    }
}
