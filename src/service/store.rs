use crate::domain::record::{OrderRecord, RecordKind, RegistrationRecord};
use crate::error::PaymentError;
use crate::repo::orders_repo::OrdersRepo;
use crate::repo::registrations_repo::RegistrationsRepo;
use crate::service::updater::StatusWrite;

#[async_trait::async_trait]
pub trait PurchasableStore: Send + Sync {
    async fn find_order(&self, id: &str) -> Result<Option<OrderRecord>, PaymentError>;

    async fn find_registration(&self, id: &str) -> Result<Option<RegistrationRecord>, PaymentError>;

    async fn order_exists(&self, id: &str) -> Result<bool, PaymentError>;

    async fn registration_exists(&self, id: &str) -> Result<bool, PaymentError>;

    async fn find_order_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<OrderRecord>, PaymentError>;

    async fn find_registration_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<RegistrationRecord>, PaymentError>;

    async fn record_initiation(
        &self,
        kind: RecordKind,
        id: &str,
        gateway: &str,
        tracking_id: &str,
    ) -> Result<(), PaymentError>;

    // Returns the number of rows moved out of the pending state.
    async fn apply(&self, kind: RecordKind, id: &str, write: &StatusWrite)
        -> Result<u64, PaymentError>;
}

#[derive(Clone)]
pub struct PgStore {
    pub orders: OrdersRepo,
    pub registrations: RegistrationsRepo,
}

#[async_trait::async_trait]
impl PurchasableStore for PgStore {
    async fn find_order(&self, id: &str) -> Result<Option<OrderRecord>, PaymentError> {
        Ok(self.orders.find(id).await?)
    }

    async fn find_registration(&self, id: &str) -> Result<Option<RegistrationRecord>, PaymentError> {
        Ok(self.registrations.find(id).await?)
    }

    async fn order_exists(&self, id: &str) -> Result<bool, PaymentError> {
        Ok(self.orders.exists(id).await?)
    }

    async fn registration_exists(&self, id: &str) -> Result<bool, PaymentError> {
        Ok(self.registrations.exists(id).await?)
    }

    async fn find_order_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<OrderRecord>, PaymentError> {
        Ok(self.orders.find_by_payment_reference(reference).await?)
    }

    async fn find_registration_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<RegistrationRecord>, PaymentError> {
        Ok(self
            .registrations
            .find_by_payment_reference(reference)
            .await?)
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
                self.orders
                    .record_initiation(id, tracking_id, is_pesapal)
                    .await?
            }
            RecordKind::Event => {
                self.registrations
                    .record_initiation(id, tracking_id, is_pesapal)
                    .await?
            }
        }
        Ok(())
    }

    async fn apply(
        &self,
        kind: RecordKind,
        id: &str,
        write: &StatusWrite,
    ) -> Result<u64, PaymentError> {
        let rows = match kind {
            RecordKind::Order => {
                self.orders
                    .apply_status(id, write.payment_status.as_str(), write.record_status)
                    .await?
            }
            RecordKind::Event => {
                self.registrations
                    .apply_status(id, write.payment_status.as_str(), write.record_status)
                    .await?
            }
        };
        Ok(rows)
    }
}
