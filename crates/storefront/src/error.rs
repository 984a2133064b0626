//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; the client always receives a structured JSON body
//! (`{"error": ..., "details": ...}`) and never a stack trace.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::razorpay::GatewayError;
use crate::services::OrderServiceError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Payment gateway operation failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Order lifecycle operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderServiceError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Internal(_) | Self::Gateway(_) => true,
            Self::Order(err) => matches!(
                err,
                OrderServiceError::RefundFailed(_)
                    | OrderServiceError::Gateway(_)
                    | OrderServiceError::Store(_)
            ),
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Gateway(_) => StatusCode::BAD_GATEWAY,
            Self::Order(err) => match err {
                OrderServiceError::PaymentNotConfirmed(_)
                | OrderServiceError::Validation(_)
                | OrderServiceError::AlreadyCancelled
                | OrderServiceError::NotCancellable
                | OrderServiceError::TooCloseToDelivery => StatusCode::BAD_REQUEST,
                OrderServiceError::OrderNotFound => StatusCode::NOT_FOUND,
                OrderServiceError::Conflict => StatusCode::CONFLICT,
                OrderServiceError::RefundFailed(_) | OrderServiceError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                OrderServiceError::Gateway(_) => StatusCode::BAD_GATEWAY,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Internal failures are collapsed to a generic
    /// line; refund failures keep the gateway's description so the customer
    /// support loop has something to go on.
    fn body(&self) -> ErrorBody {
        match self {
            Self::Database(_) | Self::Internal(_) => ErrorBody {
                error: "Internal server error".to_owned(),
                details: None,
            },
            Self::Gateway(_) => ErrorBody {
                error: "Payment gateway unavailable".to_owned(),
                details: None,
            },
            Self::Order(err) => match err {
                OrderServiceError::Store(_) => ErrorBody {
                    error: "Internal server error".to_owned(),
                    details: None,
                },
                OrderServiceError::Gateway(_) => ErrorBody {
                    error: "Payment gateway unavailable".to_owned(),
                    details: None,
                },
                OrderServiceError::RefundFailed(description) => ErrorBody {
                    error: "Refund could not be processed; the order was not cancelled"
                        .to_owned(),
                    details: Some(description.clone()),
                },
                other => ErrorBody {
                    error: other.to_string(),
                    details: None,
                },
            },
            other => ErrorBody {
                error: other.to_string(),
                details: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (self.status(), Json(self.body())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_order_error_status_mapping() {
        assert_eq!(
            status_of(AppError::Order(OrderServiceError::OrderNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Order(OrderServiceError::AlreadyCancelled)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Order(OrderServiceError::NotCancellable)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Order(OrderServiceError::TooCloseToDelivery)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Order(OrderServiceError::Conflict)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Order(OrderServiceError::RefundFailed("x".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_general_status_mapping() {
        assert_eq!(
            status_of(AppError::NotFound("order".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Unauthorized("login required".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::BadRequest("bad json".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_not_leaked() {
        let body = AppError::Internal("connection string postgres://u:p@host".into()).body();
        assert_eq!(body.error, "Internal server error");
        assert!(body.details.is_none());
    }

    #[test]
    fn test_refund_failure_keeps_gateway_description() {
        let body =
            AppError::Order(OrderServiceError::RefundFailed("upstream unavailable".into())).body();
        assert_eq!(body.details.as_deref(), Some("upstream unavailable"));
    }
}
