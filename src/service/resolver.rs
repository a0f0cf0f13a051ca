use crate::domain::outcome::PaymentOutcome;
use crate::domain::record::RecordKind;
use crate::domain::reference;
use crate::error::PaymentError;
use crate::gateways::PaymentGateway;
use crate::service::store::PurchasableStore;
use crate::service::updater::{StatusUpdater, TransitionApplied};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedTarget {
    pub kind: RecordKind,
    pub record_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedNotification {
    pub kind: RecordKind,
    pub record_id: String,
    pub outcome: PaymentOutcome,
    pub applied: TransitionApplied,
}

#[derive(Clone)]
pub struct CallbackResolver {
    pub store: Arc<dyn PurchasableStore>,
    pub updater: StatusUpdater,
}

impl CallbackResolver {
    pub async fn resolve(&self, merchant_reference: &str) -> Result<ResolvedTarget, PaymentError> {
        if let Some(id) = reference::strip_event_prefix(merchant_reference) {
            return Ok(ResolvedTarget {
                kind: RecordKind::Event,
                record_id: id.to_string(),
            });
        }

        // Legacy references were written without the event prefix; the probe
        // keeps their notifications routable.
        if self.store.registration_exists(merchant_reference).await? {
            tracing::warn!(
                reference = merchant_reference,
                "unprefixed merchant reference matched an event registration"
            );
            return Ok(ResolvedTarget {
                kind: RecordKind::Event,
                record_id: merchant_reference.to_string(),
            });
        }

        Ok(ResolvedTarget {
            kind: RecordKind::Order,
            record_id: merchant_reference.to_string(),
        })
    }

    pub async fn process(
        &self,
        gateway: &dyn PaymentGateway,
        tracking_id: &str,
        merchant_reference: &str,
    ) -> Result<ProcessedNotification, PaymentError> {
        let target = self.resolve(merchant_reference).await?;
        let outcome = gateway.transaction_status(tracking_id).await?;
        let applied = self.updater.apply(target.kind, &target.record_id, outcome).await?;

        Ok(ProcessedNotification {
            kind: target.kind,
            record_id: target.record_id,
            outcome,
            applied,
        })
    }

    // For flows where the gateway already reported the outcome (PayPal
    // capture), there is nothing left to poll.
    pub async fn apply_resolved(
        &self,
        merchant_reference: &str,
        outcome: PaymentOutcome,
    ) -> Result<ProcessedNotification, PaymentError> {
        let target = self.resolve(merchant_reference).await?;
        let applied = self.updater.apply(target.kind, &target.record_id, outcome).await?;

        Ok(ProcessedNotification {
            kind: target.kind,
            record_id: target.record_id,
            outcome,
            applied,
        })
    }

    // M-Pesa callbacks carry no merchant reference; they resolve by the
    // correlation id persisted at initiation, and the outcome travels in the
    // callback itself.
    pub async fn apply_by_payment_reference(
        &self,
        payment_reference: &str,
        outcome: PaymentOutcome,
    ) -> Result<ProcessedNotification, PaymentError> {
        let target = if let Some(order) = self
            .store
            .find_order_by_reference(payment_reference)
            .await?
        {
            ResolvedTarget {
                kind: RecordKind::Order,
                record_id: order.id,
            }
        } else if let Some(registration) = self
            .store
            .find_registration_by_reference(payment_reference)
            .await?
        {
            ResolvedTarget {
                kind: RecordKind::Event,
                record_id: registration.id,
            }
        } else {
            tracing::error!(
                reference = payment_reference,
                "callback correlation id matches no record"
            );
            return Err(PaymentError::AmbiguousReference(
                payment_reference.to_string(),
            ));
        };

        let applied = self.updater.apply(target.kind, &target.record_id, outcome).await?;

        Ok(ProcessedNotification {
            kind: target.kind,
            record_id: target.record_id,
            outcome,
            applied,
        })
    }
}
