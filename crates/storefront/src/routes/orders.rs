//! Order route handlers.
//!
//! The order endpoints are the storefront's financial core: creation
//! requires a verified payment capture, and every read is scoped to the
//! authenticated customer at the store level - a handler here never holds
//! another customer's order in memory.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use marigold_core::{
    LineItem, Money, Order, OrderId, OrderSummary, ProductId, RefundDetails, ShippingAddress,
};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::{CheckoutRequest, Pagination, PaymentConfirmation};
use crate::state::AppState;

// =============================================================================
// Request / response bodies
// =============================================================================

/// One cart line as submitted at checkout.
#[derive(Debug, Deserialize)]
pub struct CheckoutLine {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub unit_price: Money,
    pub size: String,
    pub color: String,
    pub quantity: u32,
}

/// Pricing adjuncts submitted at checkout; subtotal and total are computed
/// server-side from the lines.
#[derive(Debug, Deserialize)]
pub struct CheckoutSummary {
    pub shipping: Money,
    pub taxes: Money,
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub discount_code: Option<String>,
}

/// Body for `POST /orders`.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<CheckoutLine>,
    pub summary: CheckoutSummary,
    pub shipping_address: ShippingAddress,
    pub payment: PaymentConfirmation,
}

/// Body for `POST /orders/{order_id}/cancel`.
#[derive(Debug, Default, Deserialize)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}

/// Response for `POST /orders/{order_id}/cancel`.
#[derive(Debug, Serialize)]
pub struct CancelOrderResponse {
    pub success: bool,
    pub message: String,
    pub refund_details: RefundDetails,
}

/// Response for `GET /orders`.
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub pagination: Pagination,
}

/// Paging query parameters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

const fn default_page() -> u32 {
    1
}

const fn default_limit() -> u32 {
    10
}

// =============================================================================
// Handlers
// =============================================================================

/// Create an order from the submitted cart snapshot and payment capture.
///
/// POST /orders
///
/// # Errors
///
/// 400 if the payment cannot be confirmed or the snapshot is invalid;
/// 502 if the gateway is unreachable.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let items: Vec<LineItem> = body
        .items
        .into_iter()
        .map(|line| {
            LineItem::new(
                line.product_id,
                line.name,
                line.image,
                line.unit_price,
                line.size,
                line.color,
                line.quantity,
            )
        })
        .collect();

    let subtotal: Money = items.iter().map(|item| item.subtotal).sum();
    let summary = OrderSummary::new(
        subtotal,
        body.summary.shipping,
        body.summary.taxes,
        body.summary.discount,
        body.summary.discount_code,
    );

    let order = state
        .orders()
        .create_order(
            user.email,
            CheckoutRequest {
                items,
                summary,
                shipping_address: body.shipping_address,
                payment: body.payment,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// The authenticated customer's order history, newest first.
///
/// GET /orders?page=&limit=
///
/// # Errors
///
/// 500 on persistence failures.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<PageQuery>,
) -> Result<Json<OrderListResponse>> {
    let (orders, pagination) = state
        .orders()
        .list_my_orders(&user.email, query.page, query.limit)
        .await?;

    Ok(Json(OrderListResponse { orders, pagination }))
}

/// A single order, visible only to its owner.
///
/// GET /orders/{order_id}
///
/// # Errors
///
/// 404 whether the order is missing or owned by someone else.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<String>,
) -> Result<Json<Order>> {
    let order = state
        .orders()
        .get_my_order(&OrderId::from_string(order_id), &user.email)
        .await?;

    Ok(Json(order))
}

/// Cancel an order and run the refund workflow.
///
/// POST /orders/{order_id}/cancel
///
/// A missing body is treated the same as an empty reason.
///
/// # Errors
///
/// 400 for eligibility failures, 404 for unknown/foreign orders, 409 on a
/// concurrent modification, 500 if the refund failed in a way that blocks
/// cancellation.
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<String>,
    body: Option<Json<CancelOrderRequest>>,
) -> Result<Json<CancelOrderResponse>> {
    let reason = body.and_then(|Json(b)| b.reason);

    let outcome = state
        .orders()
        .cancel_order(&OrderId::from_string(order_id), &user.email, reason)
        .await?;

    Ok(Json(CancelOrderResponse {
        success: true,
        message: outcome.message,
        refund_details: outcome.refund,
    }))
}
