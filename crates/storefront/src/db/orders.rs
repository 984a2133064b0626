//! Order store: durable persistence for order records.
//!
//! Orders are a financial/audit record - there is deliberately no delete
//! operation here, and every customer-facing read filters by `user_email`
//! in the WHERE clause so another customer's order is never even
//! materialized in memory.
//!
//! The [`OrderStore`] trait is the seam the order lifecycle service is
//! written against; [`PgOrderStore`] is the production implementation and
//! the service tests use an in-memory one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use marigold_core::{Email, Order, OrderId, OrderStatus, RefundDetails};

use super::RepositoryError;

/// One page of a customer's order history, newest first.
#[derive(Debug)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    /// Total matching orders across all pages.
    pub total: i64,
}

/// The fields a cancellation writes, applied in a single atomic update.
#[derive(Debug, Clone)]
pub struct CancellationRecord {
    pub cancelled_at: DateTime<Utc>,
    pub reason: String,
    pub refund: RefundDetails,
}

/// Port over order persistence for the customer-facing flows.
#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    /// Persist a freshly created order.
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError>;

    /// A customer's own orders, newest first.
    async fn find_for_user(
        &self,
        email: &Email,
        page: u32,
        limit: u32,
    ) -> Result<OrderPage, RepositoryError>;

    /// A single order, visible only to its owner.
    async fn find_one(
        &self,
        order_id: &OrderId,
        email: &Email,
    ) -> Result<Option<Order>, RepositoryError>;

    /// Record a cancellation, conditional on the version the caller read.
    ///
    /// Returns [`RepositoryError::Conflict`] if a concurrent write bumped
    /// the version first, [`RepositoryError::NotFound`] if the order is
    /// gone.
    async fn record_cancellation(
        &self,
        order_id: &OrderId,
        expected_version: i64,
        record: CancellationRecord,
    ) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed order store.
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Create a new store over the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO orders (
                order_id, user_email, items, summary, shipping_address,
                payment, status, estimated_delivery, admin_notes, version,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(order.order_id.as_str())
        .bind(order.user_email.as_str())
        .bind(to_json(&order.items)?)
        .bind(to_json(&order.summary)?)
        .bind(to_json(&order.shipping_address)?)
        .bind(to_json(&order.payment)?)
        .bind(order.status.as_str())
        .bind(order.estimated_delivery)
        .bind(order.admin_notes.as_deref())
        .bind(order.version)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_for_user(
        &self,
        email: &Email,
        page: u32,
        limit: u32,
    ) -> Result<OrderPage, RepositoryError> {
        let limit = i64::from(limit);
        let offset = i64::from(page.saturating_sub(1)) * limit;

        let rows = sqlx::query(
            r"
            SELECT * FROM orders
            WHERE user_email = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(email.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_email = $1")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await?;

        let orders = rows
            .iter()
            .map(order_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OrderPage { orders, total })
    }

    async fn find_one(
        &self,
        order_id: &OrderId,
        email: &Email,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM orders WHERE order_id = $1 AND user_email = $2")
            .bind(order_id.as_str())
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    async fn record_cancellation(
        &self,
        order_id: &OrderId,
        expected_version: i64,
        record: CancellationRecord,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE orders
            SET status = $3,
                cancelled_at = $4,
                cancellation_reason = $5,
                refund = $6,
                updated_at = $7,
                version = version + 1
            WHERE order_id = $1 AND version = $2
            ",
        )
        .bind(order_id.as_str())
        .bind(expected_version)
        .bind(OrderStatus::Cancelled.as_str())
        .bind(record.cancelled_at)
        .bind(record.reason)
        .bind(to_json(&record.refund)?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Zero rows: either the order vanished or the version is stale.
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE order_id = $1)")
                .bind(order_id.as_str())
                .fetch_one(&self.pool)
                .await?;

        if exists {
            Err(RepositoryError::Conflict(format!(
                "order {order_id} was modified concurrently"
            )))
        } else {
            Err(RepositoryError::NotFound)
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("failed to encode json: {e}")))
}

fn from_json<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    field: &str,
) -> Result<T, RepositoryError> {
    serde_json::from_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {field} in database: {e}")))
}

/// Decode a full order row.
///
/// Shared with the admin binary's queries in spirit only - each binary owns
/// its own mapping, per the per-binary database module convention.
pub(crate) fn order_from_row(row: &PgRow) -> Result<Order, RepositoryError> {
    let email_raw: String = row.try_get("user_email")?;
    let user_email = Email::parse(&email_raw).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
    })?;

    let status_raw: String = row.try_get("status")?;
    let status = status_raw.parse::<OrderStatus>().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
    })?;

    let refund: Option<serde_json::Value> = row.try_get("refund")?;

    Ok(Order {
        order_id: OrderId::from_string(row.try_get("order_id")?),
        user_email,
        items: from_json(row.try_get("items")?, "items")?,
        summary: from_json(row.try_get("summary")?, "summary")?,
        shipping_address: from_json(row.try_get("shipping_address")?, "shipping_address")?,
        payment: from_json(row.try_get("payment")?, "payment")?,
        status,
        estimated_delivery: row.try_get("estimated_delivery")?,
        cancelled_at: row.try_get("cancelled_at")?,
        cancellation_reason: row.try_get("cancellation_reason")?,
        refund: refund.map(|v| from_json(v, "refund")).transpose()?,
        admin_notes: row.try_get("admin_notes")?,
        version: row.try_get("version")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
