use crate::gateways::mpesa::outcome_from_result_code;
use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct CallbackEnvelope {
    #[serde(rename = "Body")]
    pub body: CallbackBody,
}

#[derive(Debug, Deserialize)]
pub struct CallbackBody {
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

#[derive(Debug, Deserialize)]
pub struct StkCallback {
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    #[serde(rename = "ResultCode")]
    pub result_code: i64,
    #[serde(rename = "ResultDesc")]
    pub result_desc: String,
}

pub async fn callback(
    State(state): State<AppState>,
    Json(envelope): Json<CallbackEnvelope>,
) -> impl IntoResponse {
    let stk = envelope.body.stk_callback;
    let outcome = outcome_from_result_code(stk.result_code);

    match state
        .resolver
        .apply_by_payment_reference(&stk.checkout_request_id, outcome)
        .await
    {
        Ok(processed) => {
            tracing::info!(
                checkout_request_id = %stk.checkout_request_id,
                record_id = %processed.record_id,
                result_desc = %stk.result_desc,
                "processed M-Pesa callback"
            );
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                checkout_request_id = %stk.checkout_request_id,
                "failed to process M-Pesa callback"
            );
        }
    }

    // Daraja retries on anything but a 2xx acknowledgment.
    (
        axum::http::StatusCode::OK,
        Json(json!({ "ResultCode": 0, "ResultDesc": "Accepted" })),
    )
}
