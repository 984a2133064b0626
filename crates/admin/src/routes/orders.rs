//! Admin order handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use marigold_core::{Order, OrderId, OrderStatus};

use crate::db::orders::{AdminOrderRepository, OrderFilter, OrderPatch, OrderStats};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Query parameters for the admin order listing.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub status: Option<String>,
    pub search: Option<String>,
}

const fn default_page() -> u32 {
    1
}

const fn default_limit() -> u32 {
    20
}

/// Response for `GET /admin/orders`.
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub success: bool,
    pub orders: Vec<Order>,
    pub total: i64,
    /// Aggregates over the full order set, independent of the filter.
    pub stats: OrderStats,
}

/// Response for `PUT /admin/orders/{order_id}`.
#[derive(Debug, Serialize)]
pub struct OrderUpdateResponse {
    pub success: bool,
    pub order: Order,
}

/// List orders across all customers, with dashboard stats.
///
/// GET /admin/orders?page=&limit=&status=&search=
///
/// # Errors
///
/// 400 for an unknown status filter, 401 for non-admins.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<OrderListResponse>> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let filter = OrderFilter {
        status,
        search: query.search.filter(|s| !s.trim().is_empty()),
    };

    let repo = AdminOrderRepository::new(state.pool());
    let (orders, total) = repo
        .list(&filter, query.page.max(1), query.limit.clamp(1, 100))
        .await?;
    let stats = repo.stats().await?;

    Ok(Json(OrderListResponse {
        success: true,
        orders,
        total,
        stats,
    }))
}

/// Apply a partial update to an order.
///
/// PUT /admin/orders/{order_id}
///
/// Admin overrides skip the customer-facing eligibility gates; the allow-list
/// check is the only gate. Only the named fields change, plus `updated_at`
/// and `version`.
///
/// # Errors
///
/// 400 for an empty patch, 404 for an unknown order.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(order_id): Path<String>,
    Json(patch): Json<OrderPatch>,
) -> Result<Json<OrderUpdateResponse>> {
    if patch.is_empty() {
        return Err(AppError::BadRequest(
            "patch must name at least one of: status, estimated_delivery, notes".into(),
        ));
    }

    let order_id = OrderId::from_string(order_id);
    let order = AdminOrderRepository::new(state.pool())
        .update(&order_id, &patch)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound(format!("order {order_id}"))
            }
            other => other.into(),
        })?;

    tracing::info!(
        order_id = %order.order_id,
        admin = %admin.email,
        status = ?patch.status,
        "admin order update"
    );

    Ok(Json(OrderUpdateResponse {
        success: true,
        order,
    }))
}
