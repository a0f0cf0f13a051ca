use std::collections::HashMap;
use std::sync::Arc;
use storefront_payments::domain::billing::BillingDetails;
use storefront_payments::domain::record::{
    OrderRecord, PaymentStatus, RecordKind, RegistrationRecord,
};
use storefront_payments::error::PaymentError;
use storefront_payments::service::initiator::{InitiateRequest, PaymentInitiator};
use storefront_payments::service::resolver::CallbackResolver;
use storefront_payments::service::store::PurchasableStore;
use storefront_payments::service::updater::{StatusUpdater, StatusWrite};
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct MemoryStore {
    pub orders: Arc<Mutex<HashMap<String, OrderRecord>>>,
    pub registrations: Arc<Mutex<HashMap<String, RegistrationRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_order(&self, id: &str, amount: f64) {
        self.orders.lock().await.insert(
            id.to_string(),
            OrderRecord {
                id: id.to_string(),
                total_amount: amount,
                payment_status: PaymentStatus::Pending,
                status: "pending".to_string(),
                payment_reference: None,
                pesapal_tracking_id: None,
            },
        );
    }

    pub async fn insert_registration(&self, id: &str, amount: f64) {
        self.registrations.lock().await.insert(
            id.to_string(),
            RegistrationRecord {
                id: id.to_string(),
                event_id: "evt-1".to_string(),
                payment_amount: amount,
                payment_status: PaymentStatus::Pending,
                status: "pending_payment".to_string(),
                payment_reference: None,
                pesapal_tracking_id: None,
            },
        );
    }

    pub async fn order(&self, id: &str) -> OrderRecord {
        self.orders.lock().await[id].clone()
    }

    pub async fn registration(&self, id: &str) -> RegistrationRecord {
        self.registrations.lock().await[id].clone()
    }
}

#[async_trait::async_trait]
impl PurchasableStore for MemoryStore {
    async fn find_order(&self, id: &str) -> Result<Option<OrderRecord>, PaymentError> {
        Ok(self.orders.lock().await.get(id).cloned())
    }

    async fn find_registration(
        &self,
        id: &str,
    ) -> Result<Option<RegistrationRecord>, PaymentError> {
        Ok(self.registrations.lock().await.get(id).cloned())
    }

    async fn order_exists(&self, id: &str) -> Result<bool, PaymentError> {
        Ok(self.orders.lock().await.contains_key(id))
    }

    async fn registration_exists(&self, id: &str) -> Result<bool, PaymentError> {
        Ok(self.registrations.lock().await.contains_key(id))
    }

    async fn find_order_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<OrderRecord>, PaymentError> {
        Ok(self
            .orders
            .lock()
            .await
            .values()
            .find(|o| o.payment_reference.as_deref() == Some(reference))
            .cloned())
    }

    async fn find_registration_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<RegistrationRecord>, PaymentError> {
        Ok(self
            .registrations
            .lock()
            .await
            .values()
            .find(|r| r.payment_reference.as_deref() == Some(reference))
            .cloned())
    }

    async fn record_initiation(
        &self,
        kind: RecordKind,
        id: &str,
        gateway: &str,
        tracking_id: &str,
    ) -> Result<(), PaymentError> {
        let is_pesapal = gateway == "pesapal";
        match kind {
            RecordKind::Order => {
                if let Some(order) = self.orders.lock().await.get_mut(id) {
                    order.payment_reference = Some(tracking_id.to_string());
                    if is_pesapal {
                        order.pesapal_tracking_id = Some(tracking_id.to_string());
                    }
                }
            }
            RecordKind::Event => {
                if let Some(registration) = self.registrations.lock().await.get_mut(id) {
                    registration.payment_reference = Some(tracking_id.to_string());
                    if is_pesapal {
                        registration.pesapal_tracking_id = Some(tracking_id.to_string());
                    }
                }
            }
        }
        Ok(())
    }

    // Mirrors the conditional update: only pending records move.
    async fn apply(
        &self,
        kind: RecordKind,
        id: &str,
        write: &StatusWrite,
    ) -> Result<u64, PaymentError> {
        match kind {
            RecordKind::Order => {
                let mut orders = self.orders.lock().await;
                match orders.get_mut(id) {
                    Some(order) if order.payment_status == PaymentStatus::Pending => {
                        order.payment_status = write.payment_status;
                        if let Some(status) = write.record_status {
                            order.status = status.to_string();
                        }
                        Ok(1)
                    }
                    _ => Ok(0),
                }
            }
            RecordKind::Event => {
                let mut registrations = self.registrations.lock().await;
                match registrations.get_mut(id) {
                    Some(registration)
                        if registration.payment_status == PaymentStatus::Pending =>
                    {
                        registration.payment_status = write.payment_status;
                        if let Some(status) = write.record_status {
                            registration.status = status.to_string();
                        }
                        Ok(1)
                    }
                    _ => Ok(0),
                }
            }
        }
    }
}

pub fn resolver_for(store: &MemoryStore) -> CallbackResolver {
    let store: Arc<dyn PurchasableStore> = Arc::new(store.clone());
    CallbackResolver {
        store: store.clone(),
        updater: StatusUpdater { store },
    }
}

pub fn updater_for(store: &MemoryStore) -> StatusUpdater {
    StatusUpdater {
        store: Arc::new(store.clone()),
    }
}

pub fn initiator_for(store: &MemoryStore) -> PaymentInitiator {
    PaymentInitiator {
        store: Arc::new(store.clone()),
    }
}

pub fn initiate_request(kind: RecordKind, record_id: &str) -> InitiateRequest {
    InitiateRequest {
        kind,
        record_id: record_id.to_string(),
        amount: None,
        currency: "KES".to_string(),
        description: "test checkout".to_string(),
        callback_url: "http://localhost:3000/payments/mock/callback".to_string(),
        billing: BillingDetails::from_parts(None, Some("0712345678".to_string()), None, None, None),
    }
}
