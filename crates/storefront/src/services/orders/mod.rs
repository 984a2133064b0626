//! Order lifecycle service.
//!
//! Owns the order state machine: creation from a cart snapshot plus a
//! confirmed payment capture, and the self-service cancellation workflow
//! (eligibility gates, refund sub-flow, atomic persistence). Status
//! transitions other than cancellation are admin operations and live in the
//! admin binary.
//!
//! The service is generic over its two ports - [`OrderStore`] and
//! [`PaymentGateway`] - so the whole workflow is testable without a
//! database or network.
//!
//! # Refund policy
//!
//! Cancellation must never silently lose money: every cancelled order
//! carries a refund record, even if only a manual-processing marker. A
//! definitively-rejected gateway refund (`BAD_REQUEST_ERROR` class) does
//! not block cancellation - it degrades to the manual marker. Any other
//! gateway failure aborts the cancellation with the order unchanged, so an
//! operator can investigate instead of mis-recording state.

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tracing::instrument;
use uuid::Uuid;

use marigold_core::{
    Email, LineItem, Money, Order, OrderId, OrderStatus, OrderSummary, OrderValidationError,
    PaymentDetails, RefundDetails, ShippingAddress,
};

use crate::db::RepositoryError;
use crate::db::orders::{CancellationRecord, OrderStore};
use crate::razorpay::{
    GatewayError, PaymentGateway, RefundNotes, RefundRequest, is_valid_payment_id,
    verify_checkout_signature,
};

/// Self-service cancellation closes this many whole days before the
/// estimated delivery date.
const MIN_DAYS_BEFORE_DELIVERY: i64 = 3;

const DEFAULT_CANCELLATION_REASON: &str = "Cancelled by customer";

/// Errors surfaced by order lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum OrderServiceError {
    /// The payment capture could not be confirmed; no order was written.
    #[error("payment not confirmed: {0}")]
    PaymentNotConfirmed(String),

    /// The cart snapshot failed validation; no order was written.
    #[error(transparent)]
    Validation(#[from] OrderValidationError),

    /// The order does not exist - or belongs to someone else, which is
    /// deliberately indistinguishable.
    #[error("order not found")]
    OrderNotFound,

    /// The order is already cancelled; nothing was changed.
    #[error("order is already cancelled")]
    AlreadyCancelled,

    /// Shipped and delivered orders can no longer be cancelled.
    #[error("cannot cancel an order that has been shipped or delivered")]
    NotCancellable,

    /// The delivery window has closed for self-service cancellation.
    #[error("orders cannot be cancelled within {MIN_DAYS_BEFORE_DELIVERY} days of estimated delivery")]
    TooCloseToDelivery,

    /// The gateway failed in a way we will not degrade on; the order is
    /// unchanged.
    #[error("refund could not be processed: {0}")]
    RefundFailed(String),

    /// A concurrent write beat this one; the caller should re-read and retry.
    #[error("order was modified concurrently")]
    Conflict,

    /// Gateway failure during order creation.
    #[error("payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Persistence failure.
    #[error(transparent)]
    Store(RepositoryError),
}

impl From<RepositoryError> for OrderServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::OrderNotFound,
            RepositoryError::Conflict(_) => Self::Conflict,
            other => Self::Store(other),
        }
    }
}

/// Policy knobs the service reads at runtime.
pub struct OrderPolicy {
    /// Status assigned to freshly created orders (`pending` or `confirmed`).
    pub initial_status: OrderStatus,
    /// Refund speed requested from the gateway.
    pub refund_speed: String,
    /// Key secret used to verify checkout callback signatures.
    pub checkout_secret: SecretString,
}

/// Payment confirmation handed back by the checkout widget.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PaymentConfirmation {
    pub gateway_order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Everything needed to create an order.
pub struct CheckoutRequest {
    pub items: Vec<LineItem>,
    pub summary: OrderSummary,
    pub shipping_address: ShippingAddress,
    pub payment: PaymentConfirmation,
}

/// Result of a successful cancellation.
#[derive(Debug)]
pub struct CancellationOutcome {
    pub refund: RefundDetails,
    /// Customer-facing message describing what happens to their money.
    pub message: String,
}

/// Pagination envelope for order history.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    fn compute(page: u32, limit: u32, total: i64) -> Self {
        let divisor = i64::from(limit.max(1));
        let total_pages = {
            let d = total / divisor;
            if total % divisor > 0 { d + 1 } else { d }
        };
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: i64::from(page) < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Outcome of the refund sub-flow, before persistence.
struct RefundOutcome {
    details: RefundDetails,
    message: &'static str,
}

/// The order lifecycle manager.
pub struct OrderService<S, G> {
    store: S,
    gateway: G,
    policy: OrderPolicy,
}

impl<S: OrderStore, G: PaymentGateway> OrderService<S, G> {
    /// Create a new service over its ports.
    pub const fn new(store: S, gateway: G, policy: OrderPolicy) -> Self {
        Self {
            store,
            gateway,
            policy,
        }
    }

    /// Create an order from a cart snapshot and a confirmed payment.
    ///
    /// The payment must verify against the checkout signature, exist on the
    /// gateway in captured state, and match the order total; otherwise
    /// nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`OrderServiceError::PaymentNotConfirmed`] when the capture
    /// cannot be confirmed, [`OrderServiceError::Validation`] for a bad
    /// snapshot, and store/gateway errors otherwise.
    #[instrument(skip_all, fields(user = %email))]
    pub async fn create_order(
        &self,
        email: Email,
        request: CheckoutRequest,
    ) -> Result<Order, OrderServiceError> {
        let confirmation = &request.payment;

        if !verify_checkout_signature(
            &confirmation.gateway_order_id,
            &confirmation.payment_id,
            &confirmation.signature,
            &self.policy.checkout_secret,
        ) {
            return Err(OrderServiceError::PaymentNotConfirmed(
                "checkout signature did not verify".to_owned(),
            ));
        }

        let payment = self.gateway.fetch_payment(&confirmation.payment_id).await?;
        if !payment.is_refundable() {
            return Err(OrderServiceError::PaymentNotConfirmed(format!(
                "payment {} is not captured (status: {})",
                confirmation.payment_id, payment.status
            )));
        }
        if payment.amount != request.summary.total.to_minor_units() {
            return Err(OrderServiceError::PaymentNotConfirmed(format!(
                "captured amount {} does not match order total {}",
                payment.amount,
                request.summary.total.to_minor_units()
            )));
        }

        let now = Utc::now();
        let order = Order::create(
            email,
            request.items,
            request.summary,
            request.shipping_address,
            PaymentDetails {
                payment_id: Some(confirmation.payment_id.clone()),
                gateway_order_id: Some(confirmation.gateway_order_id.clone()),
                amount: Money::from_minor_units(payment.amount),
                status: PaymentDetails::STATUS_SUCCESS.to_owned(),
                created_at: now,
            },
            self.policy.initial_status,
            None,
            now,
        )?;

        self.store.insert(&order).await?;
        tracing::info!(order_id = %order.order_id, total = %order.summary.total, "order created");

        Ok(order)
    }

    /// Cancel an order on behalf of its owner.
    ///
    /// Eligibility is always re-checked against the freshly loaded order,
    /// never against caller-supplied state. Once eligibility passes, the
    /// cancellation itself always succeeds - only the refund portion can
    /// degrade to manual processing.
    ///
    /// # Errors
    ///
    /// See [`OrderServiceError`]; notably [`OrderServiceError::RefundFailed`]
    /// leaves the order entirely unchanged.
    #[instrument(skip(self, reason), fields(order_id = %order_id, user = %email))]
    pub async fn cancel_order(
        &self,
        order_id: &OrderId,
        email: &Email,
        reason: Option<String>,
    ) -> Result<CancellationOutcome, OrderServiceError> {
        let order = self
            .store
            .find_one(order_id, email)
            .await?
            .ok_or(OrderServiceError::OrderNotFound)?;

        if order.status == OrderStatus::Cancelled {
            return Err(OrderServiceError::AlreadyCancelled);
        }
        if order.status.is_fulfillment_final() {
            return Err(OrderServiceError::NotCancellable);
        }

        let now = Utc::now();
        if let Some(estimated) = order.estimated_delivery {
            if whole_days_until(now, estimated) < MIN_DAYS_BEFORE_DELIVERY {
                return Err(OrderServiceError::TooCloseToDelivery);
            }
        }

        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CANCELLATION_REASON.to_owned());

        let outcome = self.run_refund(&order, &reason, now).await?;

        self.store
            .record_cancellation(
                order_id,
                order.version,
                CancellationRecord {
                    cancelled_at: now,
                    reason,
                    refund: outcome.details.clone(),
                },
            )
            .await?;

        tracing::info!(
            refund_id = %outcome.details.refund_id,
            refund_status = %outcome.details.status,
            "order cancelled"
        );

        Ok(CancellationOutcome {
            refund: outcome.details,
            message: outcome.message.to_owned(),
        })
    }

    /// The refund sub-flow. Never mutates anything; returns what should be
    /// recorded, or an error that aborts the whole cancellation.
    async fn run_refund(
        &self,
        order: &Order,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<RefundOutcome, OrderServiceError> {
        static MSG_NO_REFUND: &str =
            "Your order has been cancelled. No payment was captured, so no refund is due.";
        static MSG_MANUAL: &str = "Your order has been cancelled. Your refund will be \
            processed manually within 2-3 business days.";
        static MSG_REFUNDED: &str = "Your order has been cancelled. Your refund has been \
            initiated and will reflect in your account in 5-7 business days.";

        let total = order.summary.total;

        let Some(payment_id) = order
            .payment
            .payment_id
            .as_deref()
            .filter(|_| order.payment.is_success())
        else {
            return Ok(RefundOutcome {
                details: RefundDetails::not_required(),
                message: MSG_NO_REFUND,
            });
        };

        // A stored id that does not even have the gateway's shape would be
        // rejected as a bad request; treat it the same way without a call.
        if !is_valid_payment_id(payment_id) {
            tracing::warn!(payment_id, "malformed payment id on order; manual refund");
            return Ok(RefundOutcome {
                details: RefundDetails::manual(total, "stored payment id is malformed"),
                message: MSG_MANUAL,
            });
        }

        let payment = match self.gateway.fetch_payment(payment_id).await {
            Ok(payment) => payment,
            Err(err) if err.is_bad_request() => {
                tracing::warn!(error = %err, "gateway rejected payment lookup; manual refund");
                return Ok(RefundOutcome {
                    details: RefundDetails::manual(total, err.to_string()),
                    message: MSG_MANUAL,
                });
            }
            Err(err) => {
                tracing::error!(error = %err, "gateway payment lookup failed; aborting cancellation");
                return Err(OrderServiceError::RefundFailed(err.to_string()));
            }
        };

        if !payment.is_refundable() {
            tracing::warn!(
                status = %payment.status,
                captured = payment.captured,
                "payment not refundable; manual refund"
            );
            return Ok(RefundOutcome {
                details: RefundDetails::manual(
                    total,
                    format!("payment not in captured state (status: {})", payment.status),
                ),
                message: MSG_MANUAL,
            });
        }

        let request = RefundRequest {
            amount: total.to_minor_units(),
            speed: self.policy.refund_speed.clone(),
            notes: RefundNotes {
                reason: reason.to_owned(),
                order_id: order.order_id.to_string(),
                cancelled_at: now.to_rfc3339(),
            },
            receipt: format!("rcpt_{}", Uuid::new_v4().simple()),
        };

        match self.gateway.create_refund(payment_id, request).await {
            Ok(refund) => Ok(RefundOutcome {
                details: RefundDetails {
                    refund_id: refund.id,
                    amount: Money::from_minor_units(refund.amount),
                    status: refund.status,
                    created_at: DateTime::from_timestamp(refund.created_at, 0),
                    speed_processed: refund.speed_processed,
                    note: None,
                },
                message: MSG_REFUNDED,
            }),
            Err(err) if err.is_bad_request() => {
                tracing::warn!(error = %err, "gateway rejected refund; manual refund");
                Ok(RefundOutcome {
                    details: RefundDetails::manual(total, err.to_string()),
                    message: MSG_MANUAL,
                })
            }
            Err(err) => {
                tracing::error!(error = %err, "gateway refund failed; aborting cancellation");
                Err(OrderServiceError::RefundFailed(err.to_string()))
            }
        }
    }

    /// A customer's order history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`OrderServiceError::Store`] on persistence failures.
    #[instrument(skip(self), fields(user = %email))]
    pub async fn list_my_orders(
        &self,
        email: &Email,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Order>, Pagination), OrderServiceError> {
        let page = page.max(1);
        let limit = limit.clamp(1, 50);

        let result = self.store.find_for_user(email, page, limit).await?;
        let pagination = Pagination::compute(page, limit, result.total);

        Ok((result.orders, pagination))
    }

    /// A single order, visible only to its owner.
    ///
    /// # Errors
    ///
    /// Returns [`OrderServiceError::OrderNotFound`] whether the order is
    /// missing or owned by someone else.
    #[instrument(skip(self), fields(order_id = %order_id, user = %email))]
    pub async fn get_my_order(
        &self,
        order_id: &OrderId,
        email: &Email,
    ) -> Result<Order, OrderServiceError> {
        self.store
            .find_one(order_id, email)
            .await?
            .ok_or(OrderServiceError::OrderNotFound)
    }
}

/// Whole-day ceiling difference between two instants.
///
/// Exactly 72 hours out counts as 3 days; 71 hours rounds up to 3 as well;
/// anything at or past the instant itself is zero or negative.
fn whole_days_until(now: DateTime<Utc>, then: DateTime<Utc>) -> i64 {
    let secs = (then - now).num_seconds();
    let d = secs / 86_400;
    if secs % 86_400 > 0 { d + 1 } else { d }
}
