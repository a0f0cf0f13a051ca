use crate::config::{Gateway, GatewaySettings, SettingsProvider};
use crate::domain::outcome::PaymentOutcome;
use crate::error::PaymentError;
use crate::gateways::{ChargeRequest, GatewaySubmission, PaymentGateway, TokenCache};
use serde_json::json;

pub struct PaypalGateway {
    pub settings: SettingsProvider,
    pub client: reqwest::Client,
    pub timeout_ms: u64,
    pub tokens: TokenCache,
}

#[derive(Debug, Clone)]
pub struct CaptureResult {
    pub outcome: PaymentOutcome,
    pub merchant_reference: Option<String>,
}

fn base_url(sandbox: bool) -> &'static str {
    if sandbox {
        "https://api-m.sandbox.paypal.com"
    } else {
        "https://api-m.paypal.com"
    }
}

pub fn outcome_from_order_status(status: &str) -> PaymentOutcome {
    match status {
        "COMPLETED" => PaymentOutcome::Success,
        "VOIDED" => PaymentOutcome::Failed,
        _ => PaymentOutcome::Pending,
    }
}

impl PaypalGateway {
    async fn access_token(&self, settings: &GatewaySettings) -> Result<String, PaymentError> {
        if let Some(token) = self.tokens.get().await {
            return Ok(token);
        }

        let resp = self
            .client
            .post(format!("{}/v1/oauth2/token", base_url(settings.sandbox)))
            .basic_auth(&settings.consumer_key, Some(&settings.consumer_secret))
            .form(&[("grant_type", "client_credentials")])
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
        let expires_in = body.get("expires_in").and_then(|v| v.as_i64()).unwrap_or(3600) as u64;

        self.tokens.put(token, expires_in).await;
        Ok(token.to_string())
    }

    pub async fn capture(&self, order_id: &str) -> Result<CaptureResult, PaymentError> {
        let settings = self.settings.gateway(Gateway::Paypal).await?;
        let token = self.access_token(&settings).await?;

        let resp = self
            .client
            .post(format!(
                "{}/v2/checkout/orders/{order_id}/capture",
                base_url(settings.sandbox)
            ))
            .bearer_auth(&token)
            .json(&json!({}))
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await?;

        let status = resp.status();
        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| PaymentError::Submission(format!("malformed capture response: {e}")))?;

        if !status.is_success() {
            return Err(PaymentError::Submission(v.to_string()));
        }

        let order_status = v.get("status").and_then(|s| s.as_str()).unwrap_or_default();
        let merchant_reference = v
            .get("purchase_units")
            .and_then(|u| u.get(0))
            .and_then(|u| u.get("reference_id"))
            .and_then(|r| r.as_str())
            .map(ToString::to_string);

        Ok(CaptureResult {
            outcome: outcome_from_order_status(order_status),
            merchant_reference,
        })
    }
}

#[async_trait::async_trait]
impl PaymentGateway for PaypalGateway {
    fn name(&self) -> &'static str {
        "paypal"
    }

    async fn submit(&self, request: &ChargeRequest) -> Result<GatewaySubmission, PaymentError> {
        let settings = self.settings.gateway(Gateway::Paypal).await?;
        let token = self.access_token(&settings).await?;

        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "reference_id": request.merchant_reference,
                "description": request.description,
                "amount": {
                    "currency_code": request.currency,
                    "value": format!("{:.2}", request.amount),
                },
            }],
            "application_context": {
                "return_url": request.callback_url,
                "cancel_url": request.callback_url,
                "user_action": "PAY_NOW",
            },
        });

        let resp = self
            .client
            .post(format!("{}/v2/checkout/orders", base_url(settings.sandbox)))
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

        if !status.is_success() {
            return Err(PaymentError::Submission(v.to_string()));
        }

        let tracking_id = v
            .get("id")
            .and_then(|id| id.as_str())
            .ok_or_else(|| PaymentError::Submission(v.to_string()))?
            .to_string();
        let redirect_url = v
            .get("links")
            .and_then(|links| links.as_array())
            .and_then(|links| {
                links.iter().find(|link| {
                    link.get("rel").and_then(|r| r.as_str()) == Some("approve")
                })
            })
            .and_then(|link| link.get("href"))
            .and_then(|href| href.as_str())
            .map(ToString::to_string);

        Ok(GatewaySubmission {
            tracking_id,
            redirect_url,
            customer_message: None,
        })
    }

    async fn transaction_status(&self, tracking_id: &str) -> Result<PaymentOutcome, PaymentError> {
        let settings = self.settings.gateway(Gateway::Paypal).await?;
        let token = self.access_token(&settings).await?;

        let resp = self
            .client
            .get(format!(
                "{}/v2/checkout/orders/{tracking_id}",
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
        match v.get("status").and_then(|s| s.as_str()) {
            Some(status) => Ok(outcome_from_order_status(status)),
            None => Ok(PaymentOutcome::Pending),
        }
    }
}
