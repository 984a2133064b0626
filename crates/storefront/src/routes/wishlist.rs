//! Wishlist handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use marigold_core::{Product, ProductId};

use crate::db::RepositoryError;
use crate::db::wishlist::WishlistRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Response for `GET /wishlist`.
#[derive(Debug, Serialize)]
pub struct WishlistResponse {
    pub products: Vec<Product>,
}

/// The customer's wishlisted products.
///
/// GET /wishlist
///
/// # Errors
///
/// 500 on persistence failures.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<WishlistResponse>> {
    let products = WishlistRepository::new(state.pool()).list(&user.email).await?;

    Ok(Json(WishlistResponse { products }))
}

/// Add a product to the wishlist (idempotent).
///
/// PUT /wishlist/{product_id}
///
/// # Errors
///
/// 404 if the product does not exist.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<i32>,
) -> Result<StatusCode> {
    WishlistRepository::new(state.pool())
        .add(&user.email, ProductId::new(product_id))
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("product {product_id}")),
            other => other.into(),
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove a product from the wishlist.
///
/// DELETE /wishlist/{product_id}
///
/// # Errors
///
/// 404 if the product was not wishlisted.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<i32>,
) -> Result<StatusCode> {
    let removed = WishlistRepository::new(state.pool())
        .remove(&user.email, ProductId::new(product_id))
        .await?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("product {product_id}")))
    }
}
