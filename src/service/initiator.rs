use crate::domain::billing::{normalize_msisdn, BillingDetails};
use crate::domain::record::RecordKind;
use crate::domain::reference;
use crate::error::PaymentError;
use crate::gateways::{ChargeRequest, PaymentGateway};
use crate::service::store::PurchasableStore;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct InitiateRequest {
    pub kind: RecordKind,
    pub record_id: String,
    pub amount: Option<f64>,
    pub currency: String,
    pub description: String,
    pub callback_url: String,
    pub billing: BillingDetails,
}

#[derive(Debug, Clone, Serialize)]
pub struct InitiatedPayment {
    pub tracking_id: String,
    pub redirect_url: Option<String>,
    pub customer_message: Option<String>,
}

#[derive(Clone)]
pub struct PaymentInitiator {
    pub store: Arc<dyn PurchasableStore>,
}

impl PaymentInitiator {
    // Initiation is never retried here: a silent repeat risks a duplicate
    // charge. Failures go back to the caller as-is.
    pub async fn initiate(
        &self,
        gateway: &dyn PaymentGateway,
        request: InitiateRequest,
    ) -> Result<InitiatedPayment, PaymentError> {
        let stored_amount = match request.kind {
            RecordKind::Order => {
                self.store
                    .find_order(&request.record_id)
                    .await?
                    .ok_or_else(|| {
                        PaymentError::NotFound(format!("order {}", request.record_id))
                    })?
                    .total_amount
            }
            RecordKind::Event => {
                self.store
                    .find_registration(&request.record_id)
                    .await?
                    .ok_or_else(|| {
                        PaymentError::NotFound(format!("event registration {}", request.record_id))
                    })?
                    .payment_amount
            }
        };

        let mut billing = request.billing;
        billing.phone = normalize_msisdn(&billing.phone);

        let merchant_reference = reference::for_record(request.kind, &request.record_id);
        let charge = ChargeRequest {
            merchant_reference,
            amount: request.amount.unwrap_or(stored_amount),
            currency: request.currency,
            description: request.description,
            callback_url: request.callback_url,
            billing,
        };

        let submission = gateway.submit(&charge).await?;

        self.store
            .record_initiation(
                request.kind,
                &request.record_id,
                gateway.name(),
                &submission.tracking_id,
            )
            .await?;

        tracing::info!(
            kind = request.kind.as_str(),
            record_id = %request.record_id,
            gateway = gateway.name(),
            tracking_id = %submission.tracking_id,
            "payment initiated"
        );

        Ok(InitiatedPayment {
            tracking_id: submission.tracking_id,
            redirect_url: submission.redirect_url,
            customer_message: submission.customer_message,
        })
    }
}
