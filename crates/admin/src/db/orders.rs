//! Admin-side order queries: cross-customer listing, aggregate stats, and
//! authorized patches.
//!
//! Unlike the storefront's order store, queries here are not scoped to a
//! customer - the caller has already passed the admin capability check.
//! There is still no delete: orders are a durable financial record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, QueryBuilder, Row};

use marigold_core::{Email, Money, Order, OrderId, OrderStatus};

use super::RepositoryError;

/// Filters for the admin order listing.
#[derive(Debug, Default, Clone)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Case-insensitive substring match over order id and customer email.
    pub search: Option<String>,
}

/// Partial update applied by an admin. Absent fields are left untouched.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl OrderPatch {
    /// Whether the patch changes anything at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.estimated_delivery.is_none() && self.notes.is_none()
    }
}

/// Aggregate order statistics for the back-office dashboard.
///
/// Computed over the full order set, not the current filter or page;
/// revenue excludes cancelled orders (their money went back).
#[derive(Debug, Clone, serde::Serialize)]
pub struct OrderStats {
    pub pending: i64,
    pub confirmed: i64,
    pub processing: i64,
    pub shipped: i64,
    pub delivered: i64,
    pub cancelled: i64,
    pub total_orders: i64,
    pub revenue: Money,
}

/// Repository for admin order operations.
pub struct AdminOrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminOrderRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders across all customers, newest first.
    ///
    /// Returns the page plus the total count matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query or decode failure.
    pub async fn list(
        &self,
        filter: &OrderFilter,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Order>, i64), RepositoryError> {
        let limit = i64::from(limit);
        let offset = i64::from(page.saturating_sub(1)) * limit;

        let mut query = QueryBuilder::new("SELECT * FROM orders WHERE TRUE");
        push_filters(&mut query, filter);
        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let rows = query.build().fetch_all(self.pool).await?;
        let orders = rows
            .iter()
            .map(order_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM orders WHERE TRUE");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        Ok((orders, total))
    }

    /// Aggregate stats over the full order set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS count FROM orders GROUP BY status")
            .fetch_all(self.pool)
            .await?;

        let mut stats = OrderStats {
            pending: 0,
            confirmed: 0,
            processing: 0,
            shipped: 0,
            delivered: 0,
            cancelled: 0,
            total_orders: 0,
            revenue: Money::ZERO,
        };

        for row in rows {
            let status: String = row.try_get("status")?;
            let count: i64 = row.try_get("count")?;
            stats.total_orders += count;
            match status.parse::<OrderStatus>() {
                Ok(OrderStatus::Pending) => stats.pending = count,
                Ok(OrderStatus::Confirmed) => stats.confirmed = count,
                Ok(OrderStatus::Processing) => stats.processing = count,
                Ok(OrderStatus::Shipped) => stats.shipped = count,
                Ok(OrderStatus::Delivered) => stats.delivered = count,
                Ok(OrderStatus::Cancelled) => stats.cancelled = count,
                Err(e) => {
                    return Err(RepositoryError::DataCorruption(format!(
                        "invalid status in database: {e}"
                    )));
                }
            }
        }

        let revenue: Decimal = sqlx::query_scalar(
            r"
            SELECT COALESCE(SUM((summary->>'total')::numeric), 0)
            FROM orders
            WHERE status != 'cancelled'
            ",
        )
        .fetch_one(self.pool)
        .await?;
        stats.revenue = Money::new(revenue);

        Ok(stats)
    }

    /// Apply a partial update to an order.
    ///
    /// Only the named fields change; `updated_at` and `version` are always
    /// bumped. Admin patches are not version-gated (an admin override should
    /// not bounce off a racing customer read), but the bump still invalidates
    /// any in-flight customer write.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update(
        &self,
        order_id: &OrderId,
        patch: &OrderPatch,
    ) -> Result<Order, RepositoryError> {
        let mut query = QueryBuilder::new("UPDATE orders SET updated_at = now(), version = version + 1");

        if let Some(status) = patch.status {
            query.push(", status = ");
            query.push_bind(status.as_str());
        }
        if let Some(estimated_delivery) = patch.estimated_delivery {
            query.push(", estimated_delivery = ");
            query.push_bind(estimated_delivery);
        }
        if let Some(notes) = &patch.notes {
            query.push(", admin_notes = ");
            query.push_bind(notes.clone());
        }

        query.push(" WHERE order_id = ");
        query.push_bind(order_id.as_str().to_owned());
        query.push(" RETURNING *");

        let row = query
            .build()
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        order_from_row(&row)
    }
}

/// Append the filter's WHERE clauses.
fn push_filters(query: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &OrderFilter) {
    if let Some(status) = filter.status {
        query.push(" AND status = ");
        query.push_bind(status.as_str());
    }
    if let Some(search) = &filter.search {
        query.push(" AND (order_id ILIKE '%' || ");
        query.push_bind(search.clone());
        query.push(" || '%' OR user_email ILIKE '%' || ");
        query.push_bind(search.clone());
        query.push(" || '%')");
    }
}

fn from_json<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    field: &str,
) -> Result<T, RepositoryError> {
    serde_json::from_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {field} in database: {e}")))
}

fn order_from_row(row: &PgRow) -> Result<Order, RepositoryError> {
    let email_raw: String = row.try_get("user_email")?;
    let user_email = Email::parse(&email_raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))?;

    let status_raw: String = row.try_get("status")?;
    let status = status_raw
        .parse::<OrderStatus>()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid status in database: {e}")))?;

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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_is_empty() {
        assert!(OrderPatch::default().is_empty());
        assert!(
            !OrderPatch {
                status: Some(OrderStatus::Processing),
                ..Default::default()
            }
            .is_empty()
        );
        assert!(
            !OrderPatch {
                notes: Some("leave at door".into()),
                ..Default::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn test_patch_deserializes_partial_bodies() {
        let patch: OrderPatch = serde_json::from_str(r#"{"status":"processing"}"#).unwrap();
        assert_eq!(patch.status, Some(OrderStatus::Processing));
        assert!(patch.estimated_delivery.is_none());
        assert!(patch.notes.is_none());
    }
}
