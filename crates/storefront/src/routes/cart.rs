//! Cart sync handlers.
//!
//! The client owns its local cart state; these endpoints persist a snapshot
//! per authenticated customer so carts follow them across devices. `PUT` is
//! a full idempotent replace - reconciliation is last-write-wins.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::db::carts::{CartLine, CartRepository, CartSnapshot};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Body for `PUT /cart`.
#[derive(Debug, Deserialize)]
pub struct ReplaceCartRequest {
    pub items: Vec<CartLine>,
}

/// Response for `GET /cart`; an absent server cart is an empty one.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLine>,
}

/// The customer's synced cart.
///
/// GET /cart
///
/// # Errors
///
/// 500 on persistence failures.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartResponse>> {
    let repo = CartRepository::new(state.pool());
    let items = repo
        .get(&user.email)
        .await?
        .map(|snapshot: CartSnapshot| snapshot.items)
        .unwrap_or_default();

    Ok(Json(CartResponse { items }))
}

/// Replace the synced cart with the submitted lines.
///
/// PUT /cart
///
/// # Errors
///
/// 500 on persistence failures.
pub async fn replace(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<ReplaceCartRequest>,
) -> Result<StatusCode> {
    let repo = CartRepository::new(state.pool());
    repo.put(&user.email, &body.items).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Clear the synced cart.
///
/// DELETE /cart
///
/// # Errors
///
/// 500 on persistence failures.
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<StatusCode> {
    let repo = CartRepository::new(state.pool());
    repo.clear(&user.email).await?;

    Ok(StatusCode::NO_CONTENT)
}
