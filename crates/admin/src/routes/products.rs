//! Catalog administration handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use marigold_core::{Product, ProductId};

use crate::db::products::{AdminProductRepository, ProductInput};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Response for `GET /admin/products`.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    pub products: Vec<Product>,
}

/// All products, newest first.
///
/// GET /admin/products
///
/// # Errors
///
/// 401 for non-admins, 500 on persistence failures.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ProductListResponse>> {
    let products = AdminProductRepository::new(state.pool()).list().await?;

    Ok(Json(ProductListResponse {
        success: true,
        products,
    }))
}

/// A single product.
///
/// GET /admin/products/{id}
///
/// # Errors
///
/// 404 if the product does not exist.
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    let product = AdminProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(product))
}

/// Create a product.
///
/// POST /admin/products
///
/// # Errors
///
/// 400 for an invalid payload, 401 for non-admins.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    validate(&input)?;

    let product = AdminProductRepository::new(state.pool()).create(input).await?;

    tracing::info!(product_id = %product.id, admin = %admin.email, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product's fields.
///
/// PUT /admin/products/{id}
///
/// # Errors
///
/// 404 if the product does not exist.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    validate(&input)?;

    let product = AdminProductRepository::new(state.pool())
        .update(ProductId::new(id), input)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => AppError::NotFound(format!("product {id}")),
            other => other.into(),
        })?;

    Ok(Json(product))
}

/// Delete a product. Past order snapshots are unaffected.
///
/// DELETE /admin/products/{id}
///
/// # Errors
///
/// 404 if the product does not exist.
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let deleted = AdminProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await?;

    if deleted {
        tracing::info!(product_id = id, admin = %admin.email, "product deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("product {id}")))
    }
}

fn validate(input: &ProductInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".into()));
    }
    if input.category.trim().is_empty() {
        return Err(AppError::BadRequest("category cannot be empty".into()));
    }
    if input.price.is_non_positive() {
        return Err(AppError::BadRequest("price must be positive".into()));
    }
    if let Some(pct) = input.discount_percent {
        if pct > 100 {
            return Err(AppError::BadRequest(
                "discount_percent must be between 0 and 100".into(),
            ));
        }
    }
    Ok(())
}
