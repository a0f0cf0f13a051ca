mod support;

use storefront_payments::domain::outcome::PaymentOutcome;
use storefront_payments::domain::record::RecordKind;
use storefront_payments::error::PaymentError;
use storefront_payments::gateways::mock::MockGateway;
use storefront_payments::service::store::PurchasableStore;
use support::{resolver_for, MemoryStore};

#[tokio::test]
async fn prefixed_reference_targets_event_table() {
    let store = MemoryStore::new();
    let resolver = resolver_for(&store);

    let target = resolver.resolve("EVT-abc123").await.unwrap();
    assert_eq!(target.kind, RecordKind::Event);
    assert_eq!(target.record_id, "abc123");
}

#[tokio::test]
async fn unprefixed_reference_probes_registrations() {
    let store = MemoryStore::new();
    store.insert_registration("reg-77", 1500.0).await;
    let resolver = resolver_for(&store);

    let target = resolver.resolve("reg-77").await.unwrap();
    assert_eq!(target.kind, RecordKind::Event);
    assert_eq!(target.record_id, "reg-77");
}

#[tokio::test]
async fn unknown_reference_defaults_to_order() {
    let store = MemoryStore::new();
    store.insert_registration("reg-77", 1500.0).await;
    let resolver = resolver_for(&store);

    let target = resolver.resolve("ord-42").await.unwrap();
    assert_eq!(target.kind, RecordKind::Order);
    assert_eq!(target.record_id, "ord-42");
}

#[tokio::test]
async fn processing_unknown_reference_is_ambiguous() {
    let store = MemoryStore::new();
    let resolver = resolver_for(&store);
    let gateway = MockGateway::new();
    gateway.set_status(PaymentOutcome::Success).await;

    let err = resolver
        .process(&gateway, "trk-1", "ghost-reference")
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::AmbiguousReference(_)));
}

#[tokio::test]
async fn callback_without_reference_resolves_by_correlation_id() {
    let store = MemoryStore::new();
    store.insert_order("ord-9", 2000.0).await;
    store
        .record_initiation(RecordKind::Order, "ord-9", "mpesa", "ws_CO_191220191020363925")
        .await
        .unwrap();
    let resolver = resolver_for(&store);

    let processed = resolver
        .apply_by_payment_reference("ws_CO_191220191020363925", PaymentOutcome::Success)
        .await
        .unwrap();
    assert_eq!(processed.kind, RecordKind::Order);
    assert_eq!(processed.record_id, "ord-9");
}

#[tokio::test]
async fn unknown_correlation_id_is_ambiguous() {
    let store = MemoryStore::new();
    let resolver = resolver_for(&store);

    let err = resolver
        .apply_by_payment_reference("ws_CO_none", PaymentOutcome::Success)
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::AmbiguousReference(_)));
}
