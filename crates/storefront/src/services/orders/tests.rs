//! Order lifecycle tests over in-memory ports.
//!
//! No database, no network: `MemoryOrderStore` implements [`OrderStore`]
//! over a mutex-guarded map and `ScriptedGateway` replays queued gateway
//! responses while recording every call it receives.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use sha2::Sha256;

use marigold_core::{
    Email, LineItem, Money, Order, OrderId, OrderStatus, OrderSummary, PaymentDetails, ProductId,
    RefundDetails, ShippingAddress,
};

use crate::db::RepositoryError;
use crate::db::orders::{CancellationRecord, OrderPage, OrderStore};
use crate::razorpay::{GatewayError, GatewayPayment, GatewayRefund, PaymentGateway, RefundRequest};

use super::{
    CheckoutRequest, OrderPolicy, OrderService, OrderServiceError, PaymentConfirmation,
};

const KEY_SECRET: &str = "k9vD2mQ7xW4pL8nR";

// =============================================================================
// In-memory ports
// =============================================================================

#[derive(Clone, Default)]
struct MemoryOrderStore {
    map: Arc<Mutex<HashMap<String, Order>>>,
}

impl MemoryOrderStore {
    fn new() -> Self {
        Self::default()
    }

    fn get(&self, order_id: &OrderId) -> Option<Order> {
        self.map.lock().unwrap().get(order_id.as_str()).cloned()
    }

    fn put(&self, order: Order) {
        self.map
            .lock()
            .unwrap()
            .insert(order.order_id.as_str().to_owned(), order);
    }
}

#[async_trait::async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        self.put(order.clone());
        Ok(())
    }

    async fn find_for_user(
        &self,
        email: &Email,
        page: u32,
        limit: u32,
    ) -> Result<OrderPage, RepositoryError> {
        let map = self.map.lock().unwrap();
        let mut orders: Vec<Order> = map
            .values()
            .filter(|o| o.user_email == *email)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = i64::try_from(orders.len()).unwrap();
        let offset = ((page.max(1) - 1) * limit) as usize;
        let orders = orders
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .collect();

        Ok(OrderPage { orders, total })
    }

    async fn find_one(
        &self,
        order_id: &OrderId,
        email: &Email,
    ) -> Result<Option<Order>, RepositoryError> {
        // Ownership enforced in the lookup itself, like the SQL WHERE clause.
        Ok(self
            .get(order_id)
            .filter(|order| order.user_email == *email))
    }

    async fn record_cancellation(
        &self,
        order_id: &OrderId,
        expected_version: i64,
        record: CancellationRecord,
    ) -> Result<(), RepositoryError> {
        let mut map = self.map.lock().unwrap();
        let order = map
            .get_mut(order_id.as_str())
            .ok_or(RepositoryError::NotFound)?;

        if order.version != expected_version {
            return Err(RepositoryError::Conflict("stale version".to_owned()));
        }

        order.status = OrderStatus::Cancelled;
        order.cancelled_at = Some(record.cancelled_at);
        order.cancellation_reason = Some(record.reason);
        order.refund = Some(record.refund);
        order.version += 1;
        order.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Default)]
struct ScriptedGateway {
    payments: Mutex<VecDeque<Result<GatewayPayment, GatewayError>>>,
    refunds: Mutex<VecDeque<Result<GatewayRefund, GatewayError>>>,
    fetch_calls: AtomicUsize,
    refund_calls: Mutex<Vec<(String, RefundRequest)>>,
}

impl ScriptedGateway {
    fn new() -> Self {
        Self::default()
    }

    fn queue_payment(&self, response: Result<GatewayPayment, GatewayError>) {
        self.payments.lock().unwrap().push_back(response);
    }

    fn queue_refund(&self, response: Result<GatewayRefund, GatewayError>) {
        self.refunds.lock().unwrap().push_back(response);
    }

    fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    fn refund_requests(&self) -> Vec<(String, RefundRequest)> {
        self.refund_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PaymentGateway for Arc<ScriptedGateway> {
    async fn fetch_payment(&self, _payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.payments
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected fetch_payment call")
    }

    async fn create_refund(
        &self,
        payment_id: &str,
        request: RefundRequest,
    ) -> Result<GatewayRefund, GatewayError> {
        self.refund_calls
            .lock()
            .unwrap()
            .push((payment_id.to_owned(), request));
        self.refunds
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected create_refund call")
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn money(s: &str) -> Money {
    Money::new(s.parse().unwrap())
}

fn email(s: &str) -> Email {
    Email::parse(s).unwrap()
}

fn sign(gateway_order_id: &str, payment_id: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(KEY_SECRET.as_bytes()).unwrap();
    mac.update(format!("{gateway_order_id}|{payment_id}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn service(
    store: MemoryOrderStore,
    gateway: Arc<ScriptedGateway>,
) -> OrderService<MemoryOrderStore, Arc<ScriptedGateway>> {
    OrderService::new(
        store,
        gateway,
        OrderPolicy {
            initial_status: OrderStatus::Confirmed,
            refund_speed: "normal".to_owned(),
            checkout_secret: SecretString::from(KEY_SECRET),
        },
    )
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

fn sample_summary() -> OrderSummary {
    // 99.98 + 5.00 + 9.99 - 0.00 = 114.97
    OrderSummary::new(money("99.98"), money("5.00"), money("9.99"), money("0.00"), None)
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

fn captured_payment(amount: i64) -> GatewayPayment {
    GatewayPayment {
        id: "pay_Nf2qPkgBzLvR3w".into(),
        status: "captured".into(),
        amount,
        captured: true,
        method: Some("card".into()),
        order_id: Some("order_O1xGkE4m".into()),
    }
}

fn checkout_request() -> CheckoutRequest {
    CheckoutRequest {
        items: sample_items(),
        summary: sample_summary(),
        shipping_address: sample_address(),
        payment: PaymentConfirmation {
            gateway_order_id: "order_O1xGkE4m".into(),
            payment_id: "pay_Nf2qPkgBzLvR3w".into(),
            signature: sign("order_O1xGkE4m", "pay_Nf2qPkgBzLvR3w"),
        },
    }
}

/// Insert an order owned by `owner` directly into the store, bypassing the
/// creation flow, so cancellation tests control every field.
fn seed_order(
    store: &MemoryOrderStore,
    owner: &str,
    status: OrderStatus,
    estimated_delivery: Option<chrono::DateTime<Utc>>,
    payment_id: Option<&str>,
) -> OrderId {
    let now = Utc::now();
    let mut order = Order::create(
        email(owner),
        sample_items(),
        sample_summary(),
        sample_address(),
        PaymentDetails {
            payment_id: payment_id.map(str::to_owned),
            gateway_order_id: Some("order_O1xGkE4m".into()),
            amount: money("114.97"),
            status: PaymentDetails::STATUS_SUCCESS.into(),
            created_at: now,
        },
        OrderStatus::Pending,
        estimated_delivery,
        now,
    )
    .unwrap();
    order.status = status;

    let id = order.order_id.clone();
    store.put(order);
    id
}

fn bad_request() -> GatewayError {
    GatewayError::BadRequest {
        code: "BAD_REQUEST_ERROR".into(),
        description: "The payment has not been captured".into(),
    }
}

fn server_error() -> GatewayError {
    GatewayError::Api {
        status: 502,
        description: "upstream unavailable".into(),
    }
}

// =============================================================================
// Creation
// =============================================================================

#[tokio::test]
async fn create_order_persists_snapshot_with_confirmed_payment() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.queue_payment(Ok(captured_payment(11497)));

    let svc = service(store.clone(), Arc::clone(&gateway));
    let order = svc
        .create_order(email("asha@example.com"), checkout_request())
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.summary.total, money("114.97"));
    assert_eq!(order.payment.payment_id.as_deref(), Some("pay_Nf2qPkgBzLvR3w"));
    assert_eq!(order.payment.status, "success");
    assert_eq!(order.version, 1);

    let stored = store.get(&order.order_id).unwrap();
    assert_eq!(stored, order);
}

#[tokio::test]
async fn create_order_rejects_invalid_signature_without_gateway_call() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());

    let mut request = checkout_request();
    request.payment.signature = "deadbeef".into();

    let svc = service(store.clone(), Arc::clone(&gateway));
    let err = svc
        .create_order(email("asha@example.com"), request)
        .await
        .unwrap_err();

    assert!(matches!(err, OrderServiceError::PaymentNotConfirmed(_)));
    assert_eq!(gateway.fetch_count(), 0);
    assert!(store.map.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_order_rejects_uncaptured_payment() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.queue_payment(Ok(GatewayPayment {
        status: "authorized".into(),
        captured: false,
        ..captured_payment(11497)
    }));

    let svc = service(store.clone(), Arc::clone(&gateway));
    let err = svc
        .create_order(email("asha@example.com"), checkout_request())
        .await
        .unwrap_err();

    assert!(matches!(err, OrderServiceError::PaymentNotConfirmed(_)));
    assert!(store.map.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_order_rejects_amount_mismatch() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());
    // Captured 100.00, but the order total is 114.97.
    gateway.queue_payment(Ok(captured_payment(10000)));

    let svc = service(store.clone(), Arc::clone(&gateway));
    let err = svc
        .create_order(email("asha@example.com"), checkout_request())
        .await
        .unwrap_err();

    assert!(matches!(err, OrderServiceError::PaymentNotConfirmed(_)));
    assert!(store.map.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_order_surfaces_gateway_failure() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.queue_payment(Err(server_error()));

    let svc = service(store.clone(), Arc::clone(&gateway));
    let err = svc
        .create_order(email("asha@example.com"), checkout_request())
        .await
        .unwrap_err();

    assert!(matches!(err, OrderServiceError::Gateway(_)));
    assert!(store.map.lock().unwrap().is_empty());
}

// =============================================================================
// Cancellation - happy path and refund degradation
// =============================================================================

#[tokio::test]
async fn cancel_refunds_captured_payment_and_records_gateway_status() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.queue_payment(Ok(captured_payment(11497)));
    gateway.queue_refund(Ok(GatewayRefund {
        id: "rfnd_8fPq2W".into(),
        amount: 11497,
        status: "processed".into(),
        created_at: 1_754_524_800,
        speed_processed: Some("normal".into()),
    }));

    let owner = "asha@example.com";
    let id = seed_order(
        &store,
        owner,
        OrderStatus::Pending,
        Some(Utc::now() + Duration::days(5)),
        Some("pay_Nf2qPkgBzLvR3w"),
    );

    let svc = service(store.clone(), Arc::clone(&gateway));
    let outcome = svc
        .cancel_order(&id, &email(owner), Some("changed my mind".into()))
        .await
        .unwrap();

    // Refund was issued for round(total * 100) minor units.
    let requests = gateway.refund_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "pay_Nf2qPkgBzLvR3w");
    assert_eq!(requests[0].1.amount, 11497);
    assert_eq!(requests[0].1.notes.reason, "changed my mind");
    assert_eq!(requests[0].1.notes.order_id, id.to_string());

    // Refund details mirror the gateway's response.
    assert_eq!(outcome.refund.refund_id, "rfnd_8fPq2W");
    assert_eq!(outcome.refund.status, "processed");
    assert_eq!(outcome.refund.amount, money("114.97"));
    assert_eq!(outcome.refund.speed_processed.as_deref(), Some("normal"));

    // Order state was persisted atomically.
    let stored = store.get(&id).unwrap();
    assert_eq!(stored.status, OrderStatus::Cancelled);
    assert!(stored.cancelled_at.is_some());
    assert_eq!(stored.cancellation_reason.as_deref(), Some("changed my mind"));
    assert_eq!(stored.refund, Some(outcome.refund));
    assert_eq!(stored.version, 2);
}

#[tokio::test]
async fn cancel_degrades_to_manual_refund_on_gateway_bad_request() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.queue_payment(Ok(captured_payment(11497)));
    gateway.queue_refund(Err(bad_request()));

    let owner = "asha@example.com";
    let id = seed_order(&store, owner, OrderStatus::Pending, None, Some("pay_Nf2qPkgBzLvR3w"));

    let svc = service(store.clone(), Arc::clone(&gateway));
    let outcome = svc.cancel_order(&id, &email(owner), None).await.unwrap();

    assert_eq!(outcome.refund.refund_id, RefundDetails::ID_MANUAL);
    assert_eq!(outcome.refund.status, RefundDetails::STATUS_MANUAL);
    assert_eq!(outcome.refund.amount, money("114.97"));
    assert!(outcome.refund.note.as_deref().unwrap().contains("captured"));
    assert!(outcome.message.contains("manually"));
    assert!(outcome.message.contains("2-3 business days"));

    let stored = store.get(&id).unwrap();
    assert_eq!(stored.status, OrderStatus::Cancelled);
    assert_eq!(stored.cancellation_reason.as_deref(), Some("Cancelled by customer"));
    assert!(stored.refund.unwrap().needs_manual_processing());
}

#[tokio::test]
async fn cancel_aborts_unchanged_on_unknown_gateway_error() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.queue_payment(Ok(captured_payment(11497)));
    gateway.queue_refund(Err(server_error()));

    let owner = "asha@example.com";
    let id = seed_order(&store, owner, OrderStatus::Pending, None, Some("pay_Nf2qPkgBzLvR3w"));

    let svc = service(store.clone(), Arc::clone(&gateway));
    let err = svc.cancel_order(&id, &email(owner), None).await.unwrap_err();

    assert!(matches!(err, OrderServiceError::RefundFailed(_)));

    // The order must be entirely unchanged.
    let stored = store.get(&id).unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
    assert!(stored.cancelled_at.is_none());
    assert!(stored.refund.is_none());
    assert_eq!(stored.version, 1);
}

#[tokio::test]
async fn cancel_with_no_payment_records_no_refund_required() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());

    let owner = "asha@example.com";
    let id = seed_order(&store, owner, OrderStatus::Pending, None, None);

    let svc = service(store.clone(), Arc::clone(&gateway));
    let outcome = svc.cancel_order(&id, &email(owner), None).await.unwrap();

    assert_eq!(outcome.refund.refund_id, RefundDetails::ID_NO_PAYMENT);
    assert_eq!(outcome.refund.status, RefundDetails::STATUS_NOT_REQUIRED);
    assert_eq!(outcome.refund.amount, Money::ZERO);

    // No gateway traffic at all.
    assert_eq!(gateway.fetch_count(), 0);
    assert!(gateway.refund_requests().is_empty());

    assert_eq!(store.get(&id).unwrap().status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn cancel_malformed_payment_id_goes_manual_without_gateway_call() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());

    let owner = "asha@example.com";
    let id = seed_order(&store, owner, OrderStatus::Pending, None, Some("txn-12345"));

    let svc = service(store.clone(), Arc::clone(&gateway));
    let outcome = svc.cancel_order(&id, &email(owner), None).await.unwrap();

    assert_eq!(outcome.refund.refund_id, RefundDetails::ID_MANUAL);
    assert_eq!(gateway.fetch_count(), 0);
    assert!(gateway.refund_requests().is_empty());
}

#[tokio::test]
async fn cancel_lookup_bad_request_degrades_to_manual() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.queue_payment(Err(bad_request()));

    let owner = "asha@example.com";
    let id = seed_order(&store, owner, OrderStatus::Pending, None, Some("pay_Nf2qPkgBzLvR3w"));

    let svc = service(store.clone(), Arc::clone(&gateway));
    let outcome = svc.cancel_order(&id, &email(owner), None).await.unwrap();

    assert_eq!(outcome.refund.refund_id, RefundDetails::ID_MANUAL);
    assert!(gateway.refund_requests().is_empty());
    assert_eq!(store.get(&id).unwrap().status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn cancel_lookup_unknown_error_aborts() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.queue_payment(Err(server_error()));

    let owner = "asha@example.com";
    let id = seed_order(&store, owner, OrderStatus::Pending, None, Some("pay_Nf2qPkgBzLvR3w"));

    let svc = service(store.clone(), Arc::clone(&gateway));
    let err = svc.cancel_order(&id, &email(owner), None).await.unwrap_err();

    assert!(matches!(err, OrderServiceError::RefundFailed(_)));
    assert_eq!(store.get(&id).unwrap().status, OrderStatus::Pending);
}

#[tokio::test]
async fn cancel_uncaptured_payment_goes_manual_without_refund_call() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.queue_payment(Ok(GatewayPayment {
        status: "authorized".into(),
        captured: false,
        ..captured_payment(11497)
    }));

    let owner = "asha@example.com";
    let id = seed_order(&store, owner, OrderStatus::Pending, None, Some("pay_Nf2qPkgBzLvR3w"));

    let svc = service(store.clone(), Arc::clone(&gateway));
    let outcome = svc.cancel_order(&id, &email(owner), None).await.unwrap();

    assert_eq!(outcome.refund.refund_id, RefundDetails::ID_MANUAL);
    assert!(gateway.refund_requests().is_empty());
}

// =============================================================================
// Cancellation - eligibility gates
// =============================================================================

#[tokio::test]
async fn cancel_rejects_shipped_and_delivered_orders() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());
    let owner = "asha@example.com";

    for status in [OrderStatus::Shipped, OrderStatus::Delivered] {
        let id = seed_order(&store, owner, status, None, Some("pay_Nf2qPkgBzLvR3w"));

        let svc = service(store.clone(), Arc::clone(&gateway));
        let err = svc.cancel_order(&id, &email(owner), None).await.unwrap_err();

        assert!(matches!(err, OrderServiceError::NotCancellable));
        assert_eq!(err.to_string(), "cannot cancel an order that has been shipped or delivered");

        let stored = store.get(&id).unwrap();
        assert_eq!(stored.status, status);
        assert!(stored.refund.is_none());
    }

    assert_eq!(gateway.fetch_count(), 0);
}

#[tokio::test]
async fn cancel_on_cancelled_order_is_rejected_without_second_refund() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.queue_payment(Ok(captured_payment(11497)));
    gateway.queue_refund(Ok(GatewayRefund {
        id: "rfnd_8fPq2W".into(),
        amount: 11497,
        status: "processed".into(),
        created_at: 1_754_524_800,
        speed_processed: None,
    }));

    let owner = "asha@example.com";
    let id = seed_order(&store, owner, OrderStatus::Pending, None, Some("pay_Nf2qPkgBzLvR3w"));

    let svc = service(store.clone(), Arc::clone(&gateway));
    svc.cancel_order(&id, &email(owner), None).await.unwrap();

    let err = svc.cancel_order(&id, &email(owner), None).await.unwrap_err();
    assert!(matches!(err, OrderServiceError::AlreadyCancelled));

    // Exactly one refund was ever issued.
    assert_eq!(gateway.refund_requests().len(), 1);
}

#[tokio::test]
async fn cancel_delivery_window_boundary() {
    let store = MemoryOrderStore::new();
    let owner = "asha@example.com";

    // Exactly 3 days out (whole-day ceiling = 3): allowed.
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.queue_payment(Ok(captured_payment(11497)));
    gateway.queue_refund(Ok(GatewayRefund {
        id: "rfnd_8fPq2W".into(),
        amount: 11497,
        status: "processed".into(),
        created_at: 1_754_524_800,
        speed_processed: None,
    }));
    let id = seed_order(
        &store,
        owner,
        OrderStatus::Confirmed,
        Some(Utc::now() + Duration::days(3)),
        Some("pay_Nf2qPkgBzLvR3w"),
    );
    let svc = service(store.clone(), Arc::clone(&gateway));
    assert!(svc.cancel_order(&id, &email(owner), None).await.is_ok());

    // 2 days out (ceiling = 2): rejected, nothing touched.
    let gateway = Arc::new(ScriptedGateway::new());
    let id = seed_order(
        &store,
        owner,
        OrderStatus::Confirmed,
        Some(Utc::now() + Duration::days(2)),
        Some("pay_Nf2qPkgBzLvR3w"),
    );
    let svc = service(store.clone(), Arc::clone(&gateway));
    let err = svc.cancel_order(&id, &email(owner), None).await.unwrap_err();
    assert!(matches!(err, OrderServiceError::TooCloseToDelivery));
    assert_eq!(gateway.fetch_count(), 0);
    assert_eq!(store.get(&id).unwrap().status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn cancel_without_estimated_delivery_skips_window_gate() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());
    let owner = "asha@example.com";
    let id = seed_order(&store, owner, OrderStatus::Processing, None, None);

    let svc = service(store.clone(), Arc::clone(&gateway));
    assert!(svc.cancel_order(&id, &email(owner), None).await.is_ok());
}

// =============================================================================
// Ownership and queries
// =============================================================================

#[tokio::test]
async fn foreign_orders_are_invisible() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());
    let id = seed_order(&store, "bala@example.com", OrderStatus::Pending, None, None);

    let svc = service(store.clone(), Arc::clone(&gateway));

    let err = svc
        .get_my_order(&id, &email("asha@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderServiceError::OrderNotFound));

    let err = svc
        .cancel_order(&id, &email("asha@example.com"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderServiceError::OrderNotFound));

    // The rightful owner still sees it.
    assert!(svc.get_my_order(&id, &email("bala@example.com")).await.is_ok());
}

#[tokio::test]
async fn list_my_orders_paginates_newest_first() {
    let store = MemoryOrderStore::new();
    let gateway = Arc::new(ScriptedGateway::new());
    let owner = "asha@example.com";

    let mut ids = Vec::new();
    for i in 0..3 {
        let id = seed_order(&store, owner, OrderStatus::Confirmed, None, None);
        // Stagger created_at so ordering is deterministic.
        let mut order = store.get(&id).unwrap();
        order.created_at = Utc::now() - Duration::hours(3 - i);
        store.put(order);
        ids.push(id);
    }
    // Someone else's order must not leak into the listing.
    seed_order(&store, "bala@example.com", OrderStatus::Confirmed, None, None);

    let svc = service(store.clone(), Arc::clone(&gateway));

    let (orders, pagination) = svc.list_my_orders(&email(owner), 1, 2).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].order_id, ids[2]);
    assert_eq!(orders[1].order_id, ids[1]);
    assert_eq!(pagination.total, 3);
    assert_eq!(pagination.total_pages, 2);
    assert!(pagination.has_next);
    assert!(!pagination.has_prev);

    let (orders, pagination) = svc.list_my_orders(&email(owner), 2, 2).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, ids[0]);
    assert!(!pagination.has_next);
    assert!(pagination.has_prev);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn stale_version_write_is_rejected_as_conflict() {
    let store = MemoryOrderStore::new();
    let id = seed_order(&store, "asha@example.com", OrderStatus::Pending, None, None);

    // Another writer bumped the version after our hypothetical read.
    let mut order = store.get(&id).unwrap();
    order.version = 2;
    store.put(order);

    let err = store
        .record_cancellation(
            &id,
            1,
            CancellationRecord {
                cancelled_at: Utc::now(),
                reason: "late".into(),
                refund: RefundDetails::not_required(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(&err, RepositoryError::Conflict(_)));

    // And the service maps that to its own conflict error.
    assert!(matches!(
        OrderServiceError::from(err),
        OrderServiceError::Conflict
    ));
}
