use crate::domain::outcome::PaymentOutcome;
use crate::error::PaymentError;
use crate::gateways::{ChargeRequest, GatewaySubmission, PaymentGateway};
use tokio::sync::Mutex;

pub struct MockGateway {
    pub status: Mutex<PaymentOutcome>,
}

impl MockGateway {
    // A freshly submitted payment has never been processed by the gateway.
    pub fn new() -> Self {
        Self {
            status: Mutex::new(PaymentOutcome::Pending),
        }
    }

    pub async fn set_status(&self, outcome: PaymentOutcome) {
        *self.status.lock().await = outcome;
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn submit(&self, _request: &ChargeRequest) -> Result<GatewaySubmission, PaymentError> {
        Ok(GatewaySubmission {
            tracking_id: format!("mock_txn_{}", uuid::Uuid::new_v4()),
            redirect_url: Some("https://checkout.example/approve".to_string()),
            customer_message: None,
        })
    }

    async fn transaction_status(&self, _tracking_id: &str) -> Result<PaymentOutcome, PaymentError> {
        Ok(*self.status.lock().await)
    }
}
