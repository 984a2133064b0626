//! Review handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use marigold_core::{ProductId, ReviewId};

use crate::db::products::ProductRepository;
use crate::db::reviews::{Review, ReviewInput, ReviewRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Response for `GET /products/{id}/reviews`.
#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub reviews: Vec<Review>,
}

/// Reviews for a product, newest first.
///
/// GET /products/{id}/reviews
///
/// # Errors
///
/// 404 if the product does not exist.
pub async fn index(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ReviewListResponse>> {
    let product_id = ProductId::new(id);

    // 404 for unknown products rather than an empty list.
    ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(product_id)
        .await?;

    Ok(Json(ReviewListResponse { reviews }))
}

/// Post (or replace) the customer's review of a product.
///
/// POST /products/{id}/reviews
///
/// # Errors
///
/// 400 for an out-of-range rating, 404 for an unknown product.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Json(input): Json<ReviewInput>,
) -> Result<(StatusCode, Json<Review>)> {
    if !(1..=5).contains(&input.rating) {
        return Err(AppError::BadRequest("rating must be between 1 and 5".into()));
    }
    if input.comment.trim().is_empty() {
        return Err(AppError::BadRequest("comment cannot be empty".into()));
    }

    let product_id = ProductId::new(id);
    ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let review = ReviewRepository::new(state.pool())
        .upsert(product_id, &user.email, &input)
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// Delete the customer's own review.
///
/// DELETE /reviews/{id}
///
/// # Errors
///
/// 404 if the review does not exist or belongs to someone else.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let deleted = ReviewRepository::new(state.pool())
        .delete(ReviewId::new(id), &user.email)
        .await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("review {id}")))
    }
}
