//! Business services for the storefront.

pub mod orders;

pub use orders::{
    CancellationOutcome, CheckoutRequest, OrderPolicy, OrderService, OrderServiceError,
    Pagination, PaymentConfirmation,
};
