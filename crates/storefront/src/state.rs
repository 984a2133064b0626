//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::content::ContentCache;
use crate::db::orders::PgOrderStore;
use crate::razorpay::RazorpayClient;
use crate::services::{OrderPolicy, OrderService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool and the order lifecycle service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    orders: OrderService<PgOrderStore, RazorpayClient>,
    content: ContentCache,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let gateway = RazorpayClient::new(&config.razorpay);
        let store = PgOrderStore::new(pool.clone());
        let orders = OrderService::new(
            store,
            gateway,
            OrderPolicy {
                initial_status: config.order_initial_status,
                refund_speed: config.razorpay.refund_speed.clone(),
                checkout_secret: config.razorpay.key_secret.clone(),
            },
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                orders,
                content: ContentCache::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the order lifecycle service.
    #[must_use]
    pub fn orders(&self) -> &OrderService<PgOrderStore, RazorpayClient> {
        &self.inner.orders
    }

    /// Get a reference to the marketing content cache.
    #[must_use]
    pub fn content(&self) -> &ContentCache {
        &self.inner.content
    }
}
