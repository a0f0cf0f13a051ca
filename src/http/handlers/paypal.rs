use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CaptureRequest {
    #[serde(rename = "paypalOrderId")]
    pub paypal_order_id: String,
}

pub async fn capture(
    State(state): State<AppState>,
    Json(req): Json<CaptureRequest>,
) -> impl IntoResponse {
    let captured = match state.paypal.capture(&req.paypal_order_id).await {
        Ok(captured) => captured,
        Err(e) => return e.into_response(),
    };

    // The capture response echoes the merchant reference; older orders created
    // before reference stamping fall back to the correlation id lookup.
    let result = match captured.merchant_reference {
        Some(reference) => state.resolver.apply_resolved(&reference, captured.outcome).await,
        None => {
            state
                .resolver
                .apply_by_payment_reference(&req.paypal_order_id, captured.outcome)
                .await
        }
    };

    match result {
        Ok(processed) => (axum::http::StatusCode::OK, Json(processed)).into_response(),
        Err(e) => e.into_response(),
    }
}
