use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Order,
    Event,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Order => "order",
            RecordKind::Event => "event",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => PaymentStatus::Completed,
            "failed" => PaymentStatus::Failed,
            "refunded" => PaymentStatus::Refunded,
            _ => PaymentStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    pub id: String,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub status: String,
    pub payment_reference: Option<String>,
    pub pesapal_tracking_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRecord {
    pub id: String,
    pub event_id: String,
    pub payment_amount: f64,
    pub payment_status: PaymentStatus,
    pub status: String,
    pub payment_reference: Option<String>,
    pub pesapal_tracking_id: Option<String>,
}
