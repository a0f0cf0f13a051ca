use crate::config::{Gateway, GatewaySettings, SettingsProvider};
use crate::domain::outcome::PaymentOutcome;
use crate::error::PaymentError;
use crate::gateways::{ChargeRequest, GatewaySubmission, PaymentGateway, TokenCache};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::json;

pub struct MpesaGateway {
    pub settings: SettingsProvider,
    pub client: reqwest::Client,
    pub timeout_ms: u64,
    pub tokens: TokenCache,
}

fn base_url(sandbox: bool) -> &'static str {
    if sandbox {
        "https://sandbox.safaricom.co.ke"
    } else {
        "https://api.safaricom.co.ke"
    }
}

pub fn outcome_from_result_code(code: i64) -> PaymentOutcome {
    if code == 0 {
        PaymentOutcome::Success
    } else {
        PaymentOutcome::Failed
    }
}

// Daraja serializes numeric codes inconsistently across endpoints.
fn result_code(value: &serde_json::Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse::<i64>().ok()))
}

impl MpesaGateway {
    async fn access_token(&self, settings: &GatewaySettings) -> Result<String, PaymentError> {
        if let Some(token) = self.tokens.get().await {
            return Ok(token);
        }

        let url = format!(
            "{}/oauth/v1/generate?grant_type=client_credentials",
            base_url(settings.sandbox)
        );
        let resp = self
            .client
            .get(url)
            .basic_auth(&settings.consumer_key, Some(&settings.consumer_secret))
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
        let token = body
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| PaymentError::Auth(body.to_string()))?;
        let expires_in = body
            .get("expires_in")
            .and_then(result_code)
            .unwrap_or(3599) as u64;

        self.tokens.put(token, expires_in).await;
        Ok(token.to_string())
    }

    fn stk_credentials(settings: &GatewaySettings) -> Result<(String, String, String), PaymentError> {
        let shortcode = settings
            .shortcode
            .clone()
            .ok_or_else(|| PaymentError::Configuration("MPESA_SHORTCODE is not set".to_string()))?;
        let passkey = settings
            .passkey
            .clone()
            .ok_or_else(|| PaymentError::Configuration("MPESA_PASSKEY is not set".to_string()))?;
        let timestamp = chrono::Utc::now().format("%Y%m%d%H%M%S").to_string();
        let password = STANDARD.encode(format!("{shortcode}{passkey}{timestamp}"));
        Ok((shortcode, password, timestamp))
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MpesaGateway {
    fn name(&self) -> &'static str {
        "mpesa"
    }

    async fn submit(&self, request: &ChargeRequest) -> Result<GatewaySubmission, PaymentError> {
        let settings = self.settings.gateway(Gateway::Mpesa).await?;
        let (shortcode, password, timestamp) = Self::stk_credentials(&settings)?;
        let token = self.access_token(&settings).await?;

        let body = json!({
            "BusinessShortCode": shortcode,
            "Password": password,
            "Timestamp": timestamp,
            "TransactionType": "CustomerPayBillOnline",
            "Amount": request.amount.round() as i64,
            "PartyA": request.billing.phone,
            "PartyB": shortcode,
            "PhoneNumber": request.billing.phone,
            "CallBackURL": request.callback_url,
            "AccountReference": request.merchant_reference,
            "TransactionDesc": request.description,
        });

        let resp = self
            .client
            .post(format!(
                "{}/mpesa/stkpush/v1/processrequest",
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
            .map_err(|e| PaymentError::Submission(format!("malformed STK response: {e}")))?;

        let accepted = v.get("ResponseCode").and_then(result_code) == Some(0);
        if !status.is_success() || !accepted {
            return Err(PaymentError::Submission(v.to_string()));
        }

        let tracking_id = v
            .get("CheckoutRequestID")
            .and_then(|c| c.as_str())
            .ok_or_else(|| PaymentError::Submission(v.to_string()))?
            .to_string();

        Ok(GatewaySubmission {
            tracking_id,
            redirect_url: None,
            customer_message: v
                .get("CustomerMessage")
                .and_then(|c| c.as_str())
                .map(ToString::to_string),
        })
    }

    async fn transaction_status(&self, tracking_id: &str) -> Result<PaymentOutcome, PaymentError> {
        let settings = self.settings.gateway(Gateway::Mpesa).await?;
        let (shortcode, password, timestamp) = Self::stk_credentials(&settings)?;
        let token = self.access_token(&settings).await?;

        let body = json!({
            "BusinessShortCode": shortcode,
            "Password": password,
            "Timestamp": timestamp,
            "CheckoutRequestID": tracking_id,
        });

        let resp = self
            .client
            .post(format!(
                "{}/mpesa/stkpushquery/v1/query",
                base_url(settings.sandbox)
            ))
            .bearer_auth(&token)
            .json(&body)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await;

        let resp = match resp {
            Ok(r) => r,
            // An unreachable gateway tells us nothing about the transaction.
            Err(e) if e.is_timeout() => return Ok(PaymentOutcome::Pending),
            Err(e) => return Err(e.into()),
        };

        let v: serde_json::Value = resp.json().await.unwrap_or_default();
        match v.get("ResultCode").and_then(result_code) {
            Some(code) => Ok(outcome_from_result_code(code)),
            // The query endpoint errors while the push is still in flight.
            None => Ok(PaymentOutcome::Pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_code_zero_is_success() {
        assert_eq!(outcome_from_result_code(0), PaymentOutcome::Success);
    }

    #[test]
    fn nonzero_result_codes_fail() {
        assert_eq!(outcome_from_result_code(1032), PaymentOutcome::Failed);
        assert_eq!(outcome_from_result_code(1), PaymentOutcome::Failed);
    }

    #[test]
    fn result_code_handles_string_and_number() {
        assert_eq!(result_code(&serde_json::json!(0)), Some(0));
        assert_eq!(result_code(&serde_json::json!("1032")), Some(1032));
        assert_eq!(result_code(&serde_json::json!(null)), None);
    }
}
