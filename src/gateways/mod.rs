use crate::domain::billing::BillingDetails;
use crate::domain::outcome::PaymentOutcome;
use crate::error::PaymentError;
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod mock;
pub mod mpesa;
pub mod paypal;
pub mod pesapal;

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub merchant_reference: String,
    pub amount: f64,
    pub currency: String,
    pub description: String,
    pub callback_url: String,
    pub billing: BillingDetails,
}

#[derive(Debug, Clone)]
pub struct GatewaySubmission {
    pub tracking_id: String,
    pub redirect_url: Option<String>,
    pub customer_message: Option<String>,
}

#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn submit(&self, request: &ChargeRequest) -> Result<GatewaySubmission, PaymentError>;

    async fn transaction_status(&self, tracking_id: &str) -> Result<PaymentOutcome, PaymentError>;
}

const TOKEN_REFRESH_SKEW_SECS: u64 = 60;

#[derive(Clone, Default)]
pub struct TokenCache {
    inner: Arc<RwLock<Option<(std::time::Instant, String)>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<String> {
        let read = self.inner.read().await;
        match &*read {
            Some((expires_at, token)) if std::time::Instant::now() < *expires_at => {
                Some(token.clone())
            }
            _ => None,
        }
    }

    pub async fn put(&self, token: &str, expires_in_secs: u64) {
        let ttl = expires_in_secs.saturating_sub(TOKEN_REFRESH_SKEW_SECS);
        let expires_at = std::time::Instant::now() + std::time::Duration::from_secs(ttl);
        let mut write = self.inner.write().await;
        *write = Some((expires_at, token.to_string()));
    }
}
