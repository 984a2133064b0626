//! Wire types for the Razorpay REST API.
//!
//! Amounts are integers in minor currency units throughout; only the order
//! lifecycle service converts to and from `Money`.

use serde::{Deserialize, Serialize};

/// A payment as returned by `GET /payments/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayPayment {
    pub id: String,
    /// Gateway payment status, e.g. `"captured"`, `"authorized"`, `"failed"`.
    pub status: String,
    /// Amount in minor units.
    pub amount: i64,
    /// Whether the charge has actually been captured (settled funds).
    #[serde(default)]
    pub captured: bool,
    /// Payment method, e.g. `"card"`, `"upi"`.
    #[serde(default)]
    pub method: Option<String>,
    /// Gateway-side order id this payment belongs to.
    #[serde(default)]
    pub order_id: Option<String>,
}

impl GatewayPayment {
    /// Status value for a captured payment.
    pub const STATUS_CAPTURED: &'static str = "captured";

    /// Whether a refund can be issued against this payment.
    #[must_use]
    pub fn is_refundable(&self) -> bool {
        self.captured && self.status == Self::STATUS_CAPTURED
    }
}

/// Body for `POST /payments/{id}/refund`.
#[derive(Debug, Clone, Serialize)]
pub struct RefundRequest {
    /// Amount to refund, in minor units.
    pub amount: i64,
    /// `"normal"` or `"optimum"`.
    pub speed: String,
    /// Free-form annotations stored with the refund on the gateway side.
    pub notes: RefundNotes,
    /// Unique receipt identifier for reconciliation.
    pub receipt: String,
}

/// Annotations attached to a refund for later reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct RefundNotes {
    pub reason: String,
    pub order_id: String,
    pub cancelled_at: String,
}

/// A refund as returned by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayRefund {
    pub id: String,
    /// Refunded amount in minor units.
    pub amount: i64,
    /// Refund status, e.g. `"processed"`, `"pending"`.
    pub status: String,
    /// Unix timestamp (seconds).
    pub created_at: i64,
    /// Speed the gateway actually applied.
    #[serde(default)]
    pub speed_processed: Option<String>,
}

/// Error envelope returned by the gateway on failures.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_refundable() {
        let payment: GatewayPayment = serde_json::from_str(
            r#"{"id":"pay_abc","status":"captured","amount":4250,"captured":true,"method":"card","order_id":"order_xyz"}"#,
        )
        .unwrap();
        assert!(payment.is_refundable());

        let authorized: GatewayPayment = serde_json::from_str(
            r#"{"id":"pay_abc","status":"authorized","amount":4250,"captured":false}"#,
        )
        .unwrap();
        assert!(!authorized.is_refundable());
    }

    #[test]
    fn test_error_envelope_parses() {
        let envelope: ApiErrorEnvelope = serde_json::from_str(
            r#"{"error":{"code":"BAD_REQUEST_ERROR","description":"The payment has not been captured","source":"gateway","step":"refund_initiation"}}"#,
        )
        .unwrap();
        assert_eq!(envelope.error.code, "BAD_REQUEST_ERROR");
    }

    #[test]
    fn test_refund_request_serializes_notes() {
        let request = RefundRequest {
            amount: 11497,
            speed: "normal".into(),
            notes: RefundNotes {
                reason: "changed my mind".into(),
                order_id: "ORD-abc".into(),
                cancelled_at: "2026-08-07T00:00:00Z".into(),
            },
            receipt: "rcpt_ORD-abc".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["amount"], 11497);
        assert_eq!(json["notes"]["order_id"], "ORD-abc");
    }
}
