//! Product browsing handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use marigold_core::{Product, ProductId};

use crate::db::products::{ProductFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

const fn default_page() -> u32 {
    1
}

const fn default_limit() -> u32 {
    24
}

/// Response for `GET /products`.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

/// List products with simple filtering.
///
/// GET /products?category=&size=&color=&search=&page=&limit=
///
/// # Errors
///
/// 500 on persistence failures.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductListResponse>> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);

    let filter = ProductFilter {
        category: query.category,
        size: query.size,
        color: query.color,
        search: query.search,
    };

    let repo = ProductRepository::new(state.pool());
    let (products, total) = repo.list(&filter, page, limit).await?;

    Ok(Json(ProductListResponse {
        products,
        total,
        page,
        limit,
    }))
}

/// A single product.
///
/// GET /products/{id}
///
/// # Errors
///
/// 404 if the product does not exist.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    let repo = ProductRepository::new(state.pool());
    let product = repo
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(product))
}
