//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (verifies database)
//!
//! # Orders (requires auth)
//! POST /orders                     - Create order from cart + payment capture
//! GET  /orders?page=&limit=        - Own order history, newest first
//! GET  /orders/{order_id}          - Single order (404 if not owned)
//! POST /orders/{order_id}/cancel   - Self-service cancellation + refund
//!
//! # Products (public)
//! GET  /products?category=&size=&color=&search=&page=&limit=
//! GET  /products/{id}
//! GET  /products/{id}/reviews      - Reviews for a product
//! POST /products/{id}/reviews      - Post a review (requires auth)
//! DELETE /reviews/{id}             - Delete own review (requires auth)
//!
//! # Cart sync (requires auth)
//! GET    /cart                     - Server-side cart snapshot
//! PUT    /cart                     - Replace snapshot (idempotent)
//! DELETE /cart                     - Clear snapshot
//!
//! # Account (requires auth)
//! GET  /account/profile            - Profile
//! PUT  /account/profile            - Update profile
//! GET  /account/addresses          - Saved addresses
//! POST /account/addresses          - Create address
//! PUT  /account/addresses/{id}     - Update address
//! DELETE /account/addresses/{id}   - Delete address
//!
//! # Wishlist (requires auth)
//! GET    /wishlist
//! PUT    /wishlist/{product_id}
//! DELETE /wishlist/{product_id}
//!
//! # Content (public, cached)
//! GET /content/hero-slides
//! GET /content/banner-messages
//! ```

pub mod account;
pub mod cart;
pub mod content;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::index))
        .route("/{order_id}", get(orders::show))
        .route("/{order_id}/cancel", post(orders::cancel))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route(
            "/{id}/reviews",
            get(reviews::index).post(reviews::create),
        )
}

/// Create the cart sync routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(cart::show).put(cart::replace).delete(cart::clear),
    )
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(account::profile).put(account::update_profile),
        )
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route(
            "/addresses/{id}",
            put(account::update_address).delete(account::delete_address),
        )
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new().route("/", get(wishlist::index)).route(
        "/{product_id}",
        put(wishlist::add).delete(wishlist::remove),
    )
}

/// Create the public content routes router.
pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/hero-slides", get(content::hero_slides))
        .route("/banner-messages", get(content::banner_messages))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/orders", order_routes())
        .nest("/products", product_routes())
        .route("/reviews/{id}", delete(reviews::remove))
        .nest("/cart", cart_routes())
        .nest("/account", account_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/content", content_routes())
}
