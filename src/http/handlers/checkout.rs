use crate::domain::billing::BillingDetails;
use crate::domain::record::RecordKind;
use crate::service::initiator::InitiateRequest;
use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub kind: RecordKind,
    pub record_id: String,
    pub amount: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
}

fn to_initiate(req: CheckoutRequest, currency: String, callback_url: String) -> InitiateRequest {
    let description = match req.kind {
        RecordKind::Order => format!("Storefront order {}", req.record_id),
        RecordKind::Event => format!("Event registration {}", req.record_id),
    };

    InitiateRequest {
        kind: req.kind,
        record_id: req.record_id,
        amount: req.amount,
        currency,
        description,
        callback_url,
        billing: BillingDetails::from_parts(
            req.email,
            req.phone,
            req.first_name,
            req.last_name,
            req.address,
        ),
    }
}

pub async fn mpesa(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> impl IntoResponse {
    let callback_url = format!("{}/payments/mpesa/callback", state.config.callback_base_url);
    let init = to_initiate(req, state.config.currency.clone(), callback_url);

    match state.initiator.initiate(state.mpesa.as_ref(), init).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn paypal(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> impl IntoResponse {
    // PayPal sends the buyer back to the storefront, not to a gateway callback.
    let return_url = format!("{}/payment/success", state.config.web_base_url);
    let init = to_initiate(req, state.config.paypal_currency.clone(), return_url);

    match state.initiator.initiate(state.paypal.as_ref(), init).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn pesapal(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> impl IntoResponse {
    let callback_url = format!("{}/payments/pesapal/callback", state.config.callback_base_url);
    let init = to_initiate(req, state.config.currency.clone(), callback_url);

    match state.initiator.initiate(state.pesapal.as_ref(), init).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(e) => e.into_response(),
    }
}
