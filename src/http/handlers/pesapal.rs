use crate::domain::outcome::PaymentOutcome;
use crate::AppState;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

pub const CHANGE_NOTIFICATION_TYPE: &str = "IPNCHANGE";

#[derive(Debug, Deserialize)]
pub struct PesapalNotification {
    #[serde(rename = "OrderTrackingId")]
    pub order_tracking_id: Option<String>,
    #[serde(rename = "OrderMerchantReference")]
    pub order_merchant_reference: Option<String>,
    #[serde(rename = "OrderNotificationType")]
    pub order_notification_type: Option<String>,
}

pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<PesapalNotification>,
) -> Redirect {
    let web = &state.config.web_base_url;
    let (Some(tracking_id), Some(reference)) =
        (params.order_tracking_id, params.order_merchant_reference)
    else {
        return Redirect::to(&format!("{web}/payment/error"));
    };

    match state
        .resolver
        .process(state.pesapal.as_ref(), &tracking_id, &reference)
        .await
    {
        Ok(processed) => match processed.outcome {
            PaymentOutcome::Success => {
                Redirect::to(&format!("{web}/payment/success?reference={reference}"))
            }
            PaymentOutcome::Pending => {
                Redirect::to(&format!("{web}/payment/pending?reference={reference}"))
            }
            PaymentOutcome::Failed => {
                Redirect::to(&format!("{web}/payment/error?reference={reference}"))
            }
        },
        Err(e) => {
            tracing::error!(error = %e, tracking_id = %tracking_id, "failed to process Pesapal callback");
            Redirect::to(&format!("{web}/payment/error"))
        }
    }
}

fn ack(tracking_id: &str, reference: &str, status: i32) -> serde_json::Value {
    json!({
        "orderNotificationType": CHANGE_NOTIFICATION_TYPE,
        "orderTrackingId": tracking_id,
        "orderMerchantReference": reference,
        "status": status,
    })
}

pub async fn ipn(
    State(state): State<AppState>,
    Query(params): Query<PesapalNotification>,
) -> impl IntoResponse {
    let (Some(tracking_id), Some(reference)) =
        (params.order_tracking_id, params.order_merchant_reference)
    else {
        return (
            axum::http::StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "code": "MISSING_PARAMETERS",
                    "message": "OrderTrackingId and OrderMerchantReference are required",
                }
            })),
        );
    };

    // Pesapal sends registration confirmations and other notification types
    // through the same URL; only status changes touch records.
    if params.order_notification_type.as_deref() != Some(CHANGE_NOTIFICATION_TYPE) {
        return (
            axum::http::StatusCode::OK,
            Json(ack(&tracking_id, &reference, 200)),
        );
    }

    // Once the notification is understood the gateway always gets a 2xx,
    // otherwise it retries indefinitely.
    let status = match state
        .resolver
        .process(state.pesapal.as_ref(), &tracking_id, &reference)
        .await
    {
        Ok(_) => 200,
        Err(e) => {
            tracing::error!(error = %e, tracking_id = %tracking_id, "failed to process Pesapal IPN");
            500
        }
    };

    (
        axum::http::StatusCode::OK,
        Json(ack(&tracking_id, &reference, status)),
    )
}
