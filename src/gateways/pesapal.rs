use crate::config::{Gateway, GatewaySettings, SettingsProvider};
use crate::domain::outcome::PaymentOutcome;
use crate::error::PaymentError;
use crate::gateways::{ChargeRequest, GatewaySubmission, PaymentGateway, TokenCache};
use serde_json::json;

pub struct PesapalGateway {
    pub settings: SettingsProvider,
    pub client: reqwest::Client,
    pub timeout_ms: u64,
    pub tokens: TokenCache,
}

// Pesapal bearer tokens expire after five minutes.
const TOKEN_TTL_SECS: u64 = 300;

fn base_url(sandbox: bool) -> &'static str {
    if sandbox {
        "https://cybqa.pesapal.com/pesapalv3"
    } else {
        "https://pay.pesapal.com/v3"
    }
}

pub fn outcome_from_status_code(code: i64) -> PaymentOutcome {
    match code {
        1 => PaymentOutcome::Success,
        // 2 = failed, 3 = reversed; both are terminal failures for checkout.
        2 | 3 => PaymentOutcome::Failed,
        _ => PaymentOutcome::Pending,
    }
}

impl PesapalGateway {
    async fn access_token(&self, settings: &GatewaySettings) -> Result<String, PaymentError> {
        if let Some(token) = self.tokens.get().await {
            return Ok(token);
        }

        let resp = self
            .client
            .post(format!("{}/api/Auth/RequestToken", base_url(settings.sandbox)))
            .json(&json!({
                "consumer_key": settings.consumer_key,
                "consumer_secret": settings.consumer_secret,
            }))
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PaymentError::Auth(body));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| PaymentError::Auth(format!("malformed token response: {e}")))?;

        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            return Err(PaymentError::Auth(error.to_string()));
        }

        let token = body
            .get("token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| PaymentError::Auth(body.to_string()))?;

        self.tokens.put(token, TOKEN_TTL_SECS).await;
        Ok(token.to_string())
    }

    pub async fn register_ipn(&self, ipn_url: &str) -> Result<String, PaymentError> {
        let settings = self.settings.gateway(Gateway::Pesapal).await?;
        let token = self.access_token(&settings).await?;

        let resp = self
            .client
            .post(format!(
                "{}/api/URLSetup/RegisterIPN",
                base_url(settings.sandbox)
            ))
            .bearer_auth(&token)
            .json(&json!({
                "url": ipn_url,
                "ipn_notification_type": "GET",
            }))
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await?;

        let status = resp.status();
        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| PaymentError::Submission(format!("malformed IPN response: {e}")))?;

        if !status.is_success() {
            return Err(PaymentError::Submission(v.to_string()));
        }

        v.get("ipn_id")
            .and_then(|id| id.as_str())
            .map(ToString::to_string)
            .ok_or_else(|| PaymentError::Submission(v.to_string()))
    }
}

#[async_trait::async_trait]
impl PaymentGateway for PesapalGateway {
    fn name(&self) -> &'static str {
        "pesapal"
    }

    async fn submit(&self, request: &ChargeRequest) -> Result<GatewaySubmission, PaymentError> {
        let settings = self.settings.gateway(Gateway::Pesapal).await?;
        let ipn_id = settings.ipn_id.clone().ok_or_else(|| {
            PaymentError::Configuration("PESAPAL_IPN_ID is not set; run register_ipn".to_string())
        })?;
        let token = self.access_token(&settings).await?;

        let body = json!({
            "id": request.merchant_reference,
            "currency": request.currency,
            "amount": request.amount,
            "description": request.description,
            "callback_url": request.callback_url,
            "notification_id": ipn_id,
            "billing_address": {
                "email_address": request.billing.email,
                "phone_number": request.billing.phone,
                "first_name": request.billing.first_name,
                "last_name": request.billing.last_name,
                "line_1": request.billing.address,
            },
        });

        let resp = self
            .client
            .post(format!(
                "{}/api/Transactions/SubmitOrderRequest",
                base_url(settings.sandbox)
            ))
            .bearer_auth(&token)
            .json(&body)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await?;

        let status = resp.status();
        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| PaymentError::Submission(format!("malformed order response: {e}")))?;

        if let Some(error) = v.get("error").filter(|e| !e.is_null()) {
            return Err(PaymentError::Submission(error.to_string()));
        }
        if !status.is_success() {
            return Err(PaymentError::Submission(v.to_string()));
        }

        let tracking_id = v
            .get("order_tracking_id")
            .and_then(|id| id.as_str())
            .ok_or_else(|| PaymentError::Submission(v.to_string()))?
            .to_string();

        Ok(GatewaySubmission {
            tracking_id,
            redirect_url: v
                .get("redirect_url")
                .and_then(|u| u.as_str())
                .map(ToString::to_string),
            customer_message: None,
        })
    }

    async fn transaction_status(&self, tracking_id: &str) -> Result<PaymentOutcome, PaymentError> {
        let settings = self.settings.gateway(Gateway::Pesapal).await?;
        let token = self.access_token(&settings).await?;

        let resp = self
            .client
            .get(format!(
                "{}/api/Transactions/GetTransactionStatus?orderTrackingId={tracking_id}",
                base_url(settings.sandbox)
            ))
            .bearer_auth(&token)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await;

        let resp = match resp {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return Ok(PaymentOutcome::Pending),
            Err(e) => return Err(e.into()),
        };

        let v: serde_json::Value = resp.json().await.unwrap_or_default();
        match v.get("status_code").and_then(|c| c.as_i64()) {
            Some(code) => Ok(outcome_from_status_code(code)),
            None => Ok(PaymentOutcome::Pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_one_is_success() {
        assert_eq!(outcome_from_status_code(1), PaymentOutcome::Success);
    }

    #[test]
    fn failed_and_reversed_are_terminal() {
        assert_eq!(outcome_from_status_code(2), PaymentOutcome::Failed);
        assert_eq!(outcome_from_status_code(3), PaymentOutcome::Failed);
    }

    #[test]
    fn invalid_stays_pending() {
        assert_eq!(outcome_from_status_code(0), PaymentOutcome::Pending);
    }
}
