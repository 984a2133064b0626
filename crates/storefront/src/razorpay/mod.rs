//! Razorpay payment gateway client.
//!
//! # Architecture
//!
//! - Thin REST client over `reqwest` with HTTP basic auth (key id/secret)
//! - Read-only with respect to local state: fetching payments and issuing
//!   refunds never touches the database - callers persist results
//! - Amounts on the wire are integers in minor currency units (paise);
//!   conversion to and from `Money` happens in the order lifecycle service
//!
//! # Operations
//!
//! - `fetch_payment` - look up a captured payment by id
//! - `create_refund` - issue a (possibly partial) refund
//! - [`verify_checkout_signature`] - validate the HMAC-SHA256 signature the
//!   checkout widget returns after a successful capture

mod client;
pub mod types;

pub use client::RazorpayClient;
pub use types::*;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

/// Prefix carried by every Razorpay payment id.
pub const PAYMENT_ID_PREFIX: &str = "pay_";

/// Whether a stored payment id has the gateway's id shape.
///
/// Malformed ids are caught here before any network call is made.
#[must_use]
pub fn is_valid_payment_id(id: &str) -> bool {
    id.len() > PAYMENT_ID_PREFIX.len() && id.starts_with(PAYMENT_ID_PREFIX)
}

/// Errors that can occur when talking to the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP transport failure (includes timeouts). Retriable.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway definitively rejected the request (4xx `BAD_REQUEST_ERROR`
    /// class). Not retriable; the refund flow degrades to manual processing
    /// on this class.
    #[error("gateway rejected request: {code}: {description}")]
    BadRequest { code: String, description: String },

    /// Any other gateway-side failure (5xx, unknown error codes).
    #[error("gateway error (status {status}): {description}")]
    Api { status: u16, description: String },

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl GatewayError {
    /// Whether this is the definitively-rejected class the cancellation flow
    /// is allowed to degrade on.
    #[must_use]
    pub const fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest { .. })
    }
}

/// Port over the gateway operations the order lifecycle needs.
///
/// `RazorpayClient` is the production implementation; tests script their own.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Look up a payment by gateway id.
    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError>;

    /// Issue a refund against a captured payment.
    async fn create_refund(
        &self,
        payment_id: &str,
        request: RefundRequest,
    ) -> Result<GatewayRefund, GatewayError>;
}

type HmacSha256 = Hmac<Sha256>;

/// Verify the checkout callback signature.
///
/// Razorpay signs `"{order_id}|{payment_id}"` with the key secret; the
/// checkout widget hands the hex signature back to the client, which posts
/// it to us with the order creation request.
#[must_use]
pub fn verify_checkout_signature(
    gateway_order_id: &str,
    payment_id: &str,
    signature_hex: &str,
    key_secret: &SecretString,
) -> bool {
    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(key_secret.expose_secret().as_bytes()) else {
        return false;
    };
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());

    mac.verify_slice(&signature).is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sign(order_id: &str, payment_id: &str, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_payment_id_validation() {
        assert!(is_valid_payment_id("pay_Nf2qPkgBzLvR3w"));
        assert!(!is_valid_payment_id("pay_"));
        assert!(!is_valid_payment_id("order_Nf2qPkgBzLvR3w"));
        assert!(!is_valid_payment_id(""));
    }

    #[test]
    fn test_signature_verification_accepts_valid() {
        let secret = SecretString::from("k9vD2mQ7xW4pL8nR");
        let sig = sign("order_abc", "pay_def", "k9vD2mQ7xW4pL8nR");
        assert!(verify_checkout_signature("order_abc", "pay_def", &sig, &secret));
    }

    #[test]
    fn test_signature_verification_rejects_tampered() {
        let secret = SecretString::from("k9vD2mQ7xW4pL8nR");
        let sig = sign("order_abc", "pay_def", "k9vD2mQ7xW4pL8nR");
        // Different payment id than the one signed
        assert!(!verify_checkout_signature("order_abc", "pay_xyz", &sig, &secret));
        // Garbage signature
        assert!(!verify_checkout_signature("order_abc", "pay_def", "zz-not-hex", &secret));
    }

    #[test]
    fn test_bad_request_classification() {
        let err = GatewayError::BadRequest {
            code: "BAD_REQUEST_ERROR".into(),
            description: "The payment has not been captured".into(),
        };
        assert!(err.is_bad_request());

        let err = GatewayError::Api {
            status: 502,
            description: "upstream unavailable".into(),
        };
        assert!(!err.is_bad_request());
    }
}
