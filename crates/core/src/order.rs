//! The order aggregate.
//!
//! An order is created exactly once, atomically with a successful payment
//! capture, and is never deleted - it is a durable financial record. Its
//! items, summary, shipping address, and payment details are frozen
//! snapshots of the cart at purchase time. Only `status`, the cancellation
//! fields, `estimated_delivery`, and `admin_notes` ever change afterwards,
//! and every mutation bumps `updated_at` and `version`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, Money, OrderId, ProductId};

/// Order lifecycle status.
///
/// `Shipped` and `Delivered` are terminal for self-service cancellation;
/// `Cancelled` is terminal outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order. Used for admin status counts.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// The canonical wire/storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether fulfillment has reached a point of no return.
    #[must_use]
    pub const fn is_fulfillment_final(&self) -> bool {
        matches!(self, Self::Shipped | Self::Delivered)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// A single purchased line: a frozen copy of the product at purchase time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Reference to the catalog product (which may since have changed).
    pub product_id: ProductId,
    pub name: String,
    /// Primary image URL at purchase time.
    pub image: String,
    /// Unit price at purchase time.
    pub unit_price: Money,
    pub size: String,
    pub color: String,
    pub quantity: u32,
    /// `unit_price * quantity`, computed once at creation.
    pub subtotal: Money,
}

impl LineItem {
    /// Build a line item, computing its subtotal.
    #[must_use]
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        image: impl Into<String>,
        unit_price: Money,
        size: impl Into<String>,
        color: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            product_id,
            name: name.into(),
            image: image.into(),
            unit_price,
            size: size.into(),
            color: color.into(),
            quantity,
            subtotal: unit_price * quantity,
        }
    }
}

/// Errors raised when assembling an order.
#[derive(Debug, thiserror::Error)]
pub enum OrderValidationError {
    /// The cart snapshot contained no items.
    #[error("order must contain at least one item")]
    EmptyItems,
    /// A line item had a zero quantity.
    #[error("line item '{0}' has zero quantity")]
    ZeroQuantity(String),
    /// The summary total does not satisfy the pricing invariant.
    #[error("order total {actual} does not equal subtotal + shipping + taxes - discount ({expected})")]
    SummaryMismatch {
        expected: Money,
        actual: Money,
    },
}

/// Price breakdown for an order.
///
/// `total == subtotal + shipping + taxes - discount` is established at
/// creation and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub subtotal: Money,
    pub shipping: Money,
    pub taxes: Money,
    pub discount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    pub total: Money,
}

impl OrderSummary {
    /// Assemble a summary, computing the total from its parts.
    #[must_use]
    pub fn new(
        subtotal: Money,
        shipping: Money,
        taxes: Money,
        discount: Money,
        discount_code: Option<String>,
    ) -> Self {
        Self {
            subtotal,
            shipping,
            taxes,
            discount,
            discount_code,
            total: subtotal + shipping + taxes - discount,
        }
    }

    /// The total the pricing invariant requires.
    #[must_use]
    pub fn expected_total(&self) -> Money {
        self.subtotal + self.shipping + self.taxes - self.discount
    }

    /// Check the pricing invariant.
    ///
    /// # Errors
    ///
    /// Returns [`OrderValidationError::SummaryMismatch`] if `total` does not
    /// equal `subtotal + shipping + taxes - discount`.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        let expected = self.expected_total();
        if self.total == expected {
            Ok(())
        } else {
            Err(OrderValidationError::SummaryMismatch {
                expected,
                actual: self.total,
            })
        }
    }
}

/// Shipping destination, frozen at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
}

/// Gateway payment capture details, set once at order creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// Gateway payment id (`pay_...`). Absent for zero-charge orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    /// Gateway-side order id (`order_...`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_order_id: Option<String>,
    /// Captured amount in major units.
    pub amount: Money,
    /// Capture status as confirmed at creation; `"success"` when captured.
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl PaymentDetails {
    /// Capture status value recorded for a confirmed payment.
    pub const STATUS_SUCCESS: &'static str = "success";

    /// Whether the capture was confirmed successful.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == Self::STATUS_SUCCESS
    }
}

/// Outcome of the refund sub-flow, recorded on every cancellation.
///
/// A cancelled order always carries one of these - even when no money moved,
/// so an operator can tell "nothing to refund" apart from "refund missing".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundDetails {
    /// Gateway refund id, or one of the sentinel values.
    pub refund_id: String,
    /// Refunded amount in major units.
    pub amount: Money,
    /// Gateway status, or one of the sentinel statuses.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Gateway processing speed actually applied, when a refund was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_processed: Option<String>,
    /// Operator-facing note for manual-processing cases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RefundDetails {
    /// Sentinel refund id when the order had no chargeable payment.
    pub const ID_NO_PAYMENT: &'static str = "no_payment_to_refund";
    /// Sentinel refund id when a human must process the refund out-of-band.
    pub const ID_MANUAL: &'static str = "manual_refund_required";
    /// Status paired with [`Self::ID_NO_PAYMENT`].
    pub const STATUS_NOT_REQUIRED: &'static str = "no_refund_required";
    /// Status paired with [`Self::ID_MANUAL`].
    pub const STATUS_MANUAL: &'static str = "manual_processing_required";

    /// Record for orders with no payment to refund.
    #[must_use]
    pub fn not_required() -> Self {
        Self {
            refund_id: Self::ID_NO_PAYMENT.to_owned(),
            amount: Money::ZERO,
            status: Self::STATUS_NOT_REQUIRED.to_owned(),
            created_at: None,
            speed_processed: None,
            note: None,
        }
    }

    /// Record for refunds that degraded to manual processing.
    #[must_use]
    pub fn manual(amount: Money, note: impl Into<String>) -> Self {
        Self {
            refund_id: Self::ID_MANUAL.to_owned(),
            amount,
            status: Self::STATUS_MANUAL.to_owned(),
            created_at: None,
            speed_processed: None,
            note: Some(note.into()),
        }
    }

    /// Whether a human still needs to act on this refund.
    #[must_use]
    pub fn needs_manual_processing(&self) -> bool {
        self.status == Self::STATUS_MANUAL
    }
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub user_email: Email,
    pub items: Vec<LineItem>,
    pub summary: OrderSummary,
    pub shipping_address: ShippingAddress,
    pub payment: PaymentDetails,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund: Option<RefundDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    /// Monotonic version for optimistic concurrency; starts at 1.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Assemble a new order from a cart snapshot and confirmed payment.
    ///
    /// Generates a fresh [`OrderId`] and validates the snapshot. The caller
    /// (the lifecycle service) is responsible for having confirmed the
    /// payment before calling this.
    ///
    /// # Errors
    ///
    /// Returns [`OrderValidationError`] if the snapshot has no items, a line
    /// has zero quantity, or the summary violates the pricing invariant.
    pub fn create(
        user_email: Email,
        items: Vec<LineItem>,
        summary: OrderSummary,
        shipping_address: ShippingAddress,
        payment: PaymentDetails,
        initial_status: OrderStatus,
        estimated_delivery: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Self, OrderValidationError> {
        if items.is_empty() {
            return Err(OrderValidationError::EmptyItems);
        }
        if let Some(item) = items.iter().find(|i| i.quantity == 0) {
            return Err(OrderValidationError::ZeroQuantity(item.name.clone()));
        }
        summary.validate()?;

        Ok(Self {
            order_id: OrderId::generate(),
            user_email,
            items,
            summary,
            shipping_address,
            payment,
            status: initial_status,
            estimated_delivery,
            cancelled_at: None,
            cancellation_reason: None,
            refund: None,
            admin_notes: None,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::new(s.parse().unwrap())
    }

    fn sample_items() -> Vec<LineItem> {
        vec![LineItem::new(
            ProductId::new(7),
            "Linen Shirt",
            "https://img.example.com/shirt.jpg",
            money("49.99"),
            "M",
            "Ivory",
            2,
        )]
    }

    fn sample_address() -> ShippingAddress {
        ShippingAddress {
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            address: "12 Lake Rd".into(),
            city: "Pune".into(),
            state: "MH".into(),
            zip: "411001".into(),
            country: "IN".into(),
            phone: "+91 98765 43210".into(),
        }
    }

    fn sample_payment() -> PaymentDetails {
        PaymentDetails {
            payment_id: Some("pay_abc123".into()),
            gateway_order_id: Some("order_xyz".into()),
            amount: money("114.97"),
            status: PaymentDetails::STATUS_SUCCESS.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_line_item_subtotal() {
        let item = &sample_items()[0];
        assert_eq!(item.subtotal, money("99.98"));
    }

    #[test]
    fn test_summary_total_invariant() {
        let summary = OrderSummary::new(
            money("99.98"),
            money("5.00"),
            money("9.99"),
            money("0.00"),
            None,
        );
        assert_eq!(summary.total, money("114.97"));
        assert!(summary.validate().is_ok());
    }

    #[test]
    fn test_summary_mismatch_is_rejected() {
        let mut summary = OrderSummary::new(
            money("99.98"),
            money("5.00"),
            money("9.99"),
            money("10.00"),
            Some("WELCOME10".into()),
        );
        summary.total = money("999.99");
        assert!(matches!(
            summary.validate(),
            Err(OrderValidationError::SummaryMismatch { .. })
        ));
    }

    #[test]
    fn test_create_validates_snapshot() {
        let summary = OrderSummary::new(
            money("99.98"),
            money("5.00"),
            money("9.99"),
            money("0.00"),
            None,
        );
        let order = Order::create(
            Email::parse("asha@example.com").unwrap(),
            sample_items(),
            summary.clone(),
            sample_address(),
            sample_payment(),
            OrderStatus::Confirmed,
            None,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.version, 1);
        assert!(order.refund.is_none());

        let empty = Order::create(
            Email::parse("asha@example.com").unwrap(),
            vec![],
            summary,
            sample_address(),
            sample_payment(),
            OrderStatus::Confirmed,
            None,
            Utc::now(),
        );
        assert!(matches!(empty, Err(OrderValidationError::EmptyItems)));
    }

    #[test]
    fn test_status_roundtrip() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("returned".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_fulfillment_final_states() {
        assert!(OrderStatus::Shipped.is_fulfillment_final());
        assert!(OrderStatus::Delivered.is_fulfillment_final());
        assert!(!OrderStatus::Processing.is_fulfillment_final());
        assert!(!OrderStatus::Cancelled.is_fulfillment_final());
    }

    #[test]
    fn test_refund_sentinels() {
        let none = RefundDetails::not_required();
        assert_eq!(none.refund_id, "no_payment_to_refund");
        assert_eq!(none.status, "no_refund_required");
        assert_eq!(none.amount, Money::ZERO);
        assert!(!none.needs_manual_processing());

        let manual = RefundDetails::manual(money("42.00"), "gateway rejected refund");
        assert_eq!(manual.refund_id, "manual_refund_required");
        assert!(manual.needs_manual_processing());
        assert_eq!(manual.amount, money("42.00"));
    }

    #[test]
    fn test_order_serde_roundtrip() {
        let order = Order::create(
            Email::parse("asha@example.com").unwrap(),
            sample_items(),
            OrderSummary::new(
                money("99.98"),
                money("5.00"),
                money("9.99"),
                money("0.00"),
                None,
            ),
            sample_address(),
            sample_payment(),
            OrderStatus::Pending,
            None,
            Utc::now(),
        )
        .unwrap();

        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(back, order);
    }
}
