mod support;

use storefront_payments::domain::outcome::PaymentOutcome;
use storefront_payments::domain::record::{PaymentStatus, RecordKind};
use storefront_payments::error::PaymentError;
use storefront_payments::gateways::mock::MockGateway;
use storefront_payments::gateways::PaymentGateway;
use storefront_payments::service::updater::TransitionApplied;
use support::{initiate_request, initiator_for, resolver_for, MemoryStore};

#[tokio::test]
async fn initiation_never_reports_terminal_state() {
    let store = MemoryStore::new();
    store.insert_order("ord-1", 5000.0).await;
    let initiator = initiator_for(&store);
    let gateway = MockGateway::new();

    let initiated = initiator
        .initiate(&gateway, initiate_request(RecordKind::Order, "ord-1"))
        .await
        .unwrap();

    let outcome = gateway
        .transaction_status(&initiated.tracking_id)
        .await
        .unwrap();
    assert_eq!(outcome, PaymentOutcome::Pending);
}

#[tokio::test]
async fn initiation_persists_the_tracking_id() {
    let store = MemoryStore::new();
    store.insert_order("ord-1", 5000.0).await;
    let initiator = initiator_for(&store);
    let gateway = MockGateway::new();

    let initiated = initiator
        .initiate(&gateway, initiate_request(RecordKind::Order, "ord-1"))
        .await
        .unwrap();

    let order = store.order("ord-1").await;
    assert_eq!(order.payment_reference.as_deref(), Some(initiated.tracking_id.as_str()));
    assert!(initiated.redirect_url.is_some());
}

#[tokio::test]
async fn initiating_a_missing_record_is_not_found() {
    let store = MemoryStore::new();
    let initiator = initiator_for(&store);
    let gateway = MockGateway::new();

    let err = initiator
        .initiate(&gateway, initiate_request(RecordKind::Order, "ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::NotFound(_)));
}

#[tokio::test]
async fn order_checkout_completes_end_to_end() {
    let store = MemoryStore::new();
    store.insert_order("ord-100", 5000.0).await;
    let initiator = initiator_for(&store);
    let resolver = resolver_for(&store);
    let gateway = MockGateway::new();

    let initiated = initiator
        .initiate(&gateway, initiate_request(RecordKind::Order, "ord-100"))
        .await
        .unwrap();

    gateway.set_status(PaymentOutcome::Success).await;
    let processed = resolver
        .process(&gateway, &initiated.tracking_id, "ord-100")
        .await
        .unwrap();

    assert_eq!(processed.kind, RecordKind::Order);
    assert_eq!(processed.applied, TransitionApplied::Applied);

    let order = store.order("ord-100").await;
    assert_eq!(order.payment_status, PaymentStatus::Completed);
    assert_eq!(order.status, "processing");
}

#[tokio::test]
async fn event_checkout_completes_via_prefixed_reference() {
    let store = MemoryStore::new();
    store.insert_registration("reg-100", 1200.0).await;
    let initiator = initiator_for(&store);
    let resolver = resolver_for(&store);
    let gateway = MockGateway::new();

    let initiated = initiator
        .initiate(&gateway, initiate_request(RecordKind::Event, "reg-100"))
        .await
        .unwrap();

    gateway.set_status(PaymentOutcome::Success).await;
    let processed = resolver
        .process(&gateway, &initiated.tracking_id, "EVT-reg-100")
        .await
        .unwrap();

    assert_eq!(processed.kind, RecordKind::Event);
    assert_eq!(processed.record_id, "reg-100");

    let registration = store.registration("reg-100").await;
    assert_eq!(registration.payment_status, PaymentStatus::Completed);
    assert_eq!(registration.status, "registered");
}

#[tokio::test]
async fn failed_gateway_status_fails_the_order_only() {
    let store = MemoryStore::new();
    store.insert_order("ord-200", 900.0).await;
    let resolver = resolver_for(&store);
    let gateway = MockGateway::new();
    gateway.set_status(PaymentOutcome::Failed).await;

    let processed = resolver.process(&gateway, "trk-200", "ord-200").await.unwrap();
    assert_eq!(processed.outcome, PaymentOutcome::Failed);

    let order = store.order("ord-200").await;
    assert_eq!(order.payment_status, PaymentStatus::Failed);
    assert_eq!(order.status, "pending");
}

#[tokio::test]
async fn mpesa_style_callback_completes_by_correlation_id() {
    let store = MemoryStore::new();
    store.insert_order("ord-300", 5000.0).await;
    let initiator = initiator_for(&store);
    let resolver = resolver_for(&store);
    let gateway = MockGateway::new();

    let initiated = initiator
        .initiate(&gateway, initiate_request(RecordKind::Order, "ord-300"))
        .await
        .unwrap();

    let processed = resolver
        .apply_by_payment_reference(&initiated.tracking_id, PaymentOutcome::Success)
        .await
        .unwrap();

    assert_eq!(processed.kind, RecordKind::Order);
    let order = store.order("ord-300").await;
    assert_eq!(order.payment_status, PaymentStatus::Completed);
}

#[tokio::test]
async fn pending_poll_leaves_checkout_retriable() {
    let store = MemoryStore::new();
    store.insert_order("ord-400", 100.0).await;
    let resolver = resolver_for(&store);
    let gateway = MockGateway::new();

    let processed = resolver.process(&gateway, "trk-400", "ord-400").await.unwrap();
    assert_eq!(processed.applied, TransitionApplied::Noop);

    let order = store.order("ord-400").await;
    assert_eq!(order.payment_status, PaymentStatus::Pending);
}
