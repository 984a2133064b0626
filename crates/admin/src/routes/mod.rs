//! HTTP route handlers for the admin JSON API.
//!
//! Every handler takes the [`RequireAdmin`](crate::middleware::RequireAdmin)
//! extractor, so the allow-list check runs before any handler body.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness check
//!
//! # Orders
//! GET  /admin/orders?page=&limit=&status=&search=
//! PUT  /admin/orders/{order_id}        - Partial patch (status, delivery, notes)
//!
//! # Catalog
//! GET    /admin/products
//! POST   /admin/products
//! GET    /admin/products/{id}
//! PUT    /admin/products/{id}
//! DELETE /admin/products/{id}
//!
//! # Content
//! GET    /admin/hero-slides            POST   /admin/hero-slides
//! PUT    /admin/hero-slides/{id}       DELETE /admin/hero-slides/{id}
//! GET    /admin/banner-messages        POST   /admin/banner-messages
//! PUT    /admin/banner-messages/{id}   DELETE /admin/banner-messages/{id}
//! ```

pub mod content;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

/// Create the admin order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{order_id}", put(orders::update))
}

/// Create the catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
}

/// Create the content routes router.
pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/hero-slides",
            get(content::hero_slides).post(content::create_hero_slide),
        )
        .route(
            "/hero-slides/{id}",
            put(content::update_hero_slide).delete(content::delete_hero_slide),
        )
        .route(
            "/banner-messages",
            get(content::banner_messages).post(content::create_banner_message),
        )
        .route(
            "/banner-messages/{id}",
            put(content::update_banner_message).delete(content::delete_banner_message),
        )
}

/// Create all routes for the admin API.
pub fn routes() -> Router<AppState> {
    Router::new().nest(
        "/admin",
        Router::new()
            .nest("/orders", order_routes())
            .nest("/products", product_routes())
            .merge(content_routes()),
    )
}
