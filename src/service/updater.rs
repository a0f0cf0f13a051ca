use crate::domain::outcome::PaymentOutcome;
use crate::domain::record::{PaymentStatus, RecordKind};
use crate::error::PaymentError;
use crate::service::store::PurchasableStore;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusWrite {
    pub payment_status: PaymentStatus,
    pub record_status: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionApplied {
    Applied,
    AlreadyTerminal,
    Noop,
}

// A successful payment moves the record forward in the same write; a failed
// one touches payment_status alone. Pending notifications change nothing.
pub fn plan_transition(kind: RecordKind, outcome: PaymentOutcome) -> Option<StatusWrite> {
    match outcome {
        PaymentOutcome::Success => Some(StatusWrite {
            payment_status: PaymentStatus::Completed,
            record_status: Some(match kind {
                RecordKind::Order => "processing",
                RecordKind::Event => "registered",
            }),
        }),
        PaymentOutcome::Failed => Some(StatusWrite {
            payment_status: PaymentStatus::Failed,
            record_status: None,
        }),
        PaymentOutcome::Pending => None,
    }
}

#[derive(Clone)]
pub struct StatusUpdater {
    pub store: Arc<dyn PurchasableStore>,
}

impl StatusUpdater {
    pub async fn apply(
        &self,
        kind: RecordKind,
        id: &str,
        outcome: PaymentOutcome,
    ) -> Result<TransitionApplied, PaymentError> {
        let Some(write) = plan_transition(kind, outcome) else {
            return Ok(TransitionApplied::Noop);
        };

        let rows = self.store.apply(kind, id, &write).await?;
        if rows > 0 {
            tracing::info!(
                kind = kind.as_str(),
                record_id = id,
                payment_status = write.payment_status.as_str(),
                "payment status transition applied"
            );
            return Ok(TransitionApplied::Applied);
        }

        let exists = match kind {
            RecordKind::Order => self.store.order_exists(id).await?,
            RecordKind::Event => self.store.registration_exists(id).await?,
        };

        if exists {
            // Duplicate or late notification for a record already in a
            // terminal state; applying the same outcome twice is harmless.
            tracing::debug!(kind = kind.as_str(), record_id = id, "record already terminal");
            Ok(TransitionApplied::AlreadyTerminal)
        } else {
            tracing::error!(
                kind = kind.as_str(),
                record_id = id,
                "notification references a record that does not exist"
            );
            Err(PaymentError::AmbiguousReference(id.to_string()))
        }
    }
}
