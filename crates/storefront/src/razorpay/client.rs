//! HTTP client for the Razorpay REST API.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::config::RazorpayConfig;

use super::types::{ApiErrorEnvelope, GatewayPayment, GatewayRefund, RefundRequest};
use super::{GatewayError, PaymentGateway};

/// Bounded per-request timeout; a hung gateway must not hang a cancellation
/// handler indefinitely. Timeouts surface as `GatewayError::Http`, which the
/// lifecycle treats as retriable (it aborts rather than degrades).
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Razorpay payments API.
pub struct RazorpayClient {
    http: reqwest::Client,
    api_base: String,
    key_id: String,
    key_secret: SecretString,
}

impl RazorpayClient {
    /// Create a new client from gateway configuration.
    #[must_use]
    pub fn new(config: &RazorpayConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        }
    }

    /// Decode a gateway response, translating error envelopes.
    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        // Razorpay wraps failures in {"error": {code, description, ...}}.
        let (code, description) = match serde_json::from_str::<ApiErrorEnvelope>(&body) {
            Ok(envelope) => (envelope.error.code, envelope.error.description),
            Err(_) => (String::new(), body),
        };

        if status.as_u16() == 400 || code == "BAD_REQUEST_ERROR" {
            return Err(GatewayError::BadRequest { code, description });
        }

        Err(GatewayError::Api {
            status: status.as_u16(),
            description,
        })
    }
}

#[async_trait::async_trait]
impl PaymentGateway for RazorpayClient {
    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        let url = format!("{}/payments/{payment_id}", self.api_base);
        tracing::debug!(payment_id, "fetching payment from gateway");

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn create_refund(
        &self,
        payment_id: &str,
        request: RefundRequest,
    ) -> Result<GatewayRefund, GatewayError> {
        let url = format!("{}/payments/{payment_id}/refund", self.api_base);
        tracing::info!(payment_id, amount = request.amount, "issuing gateway refund");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(&request)
            .send()
            .await?;

        Self::decode(response).await
    }
}
