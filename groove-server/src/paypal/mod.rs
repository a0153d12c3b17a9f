//! PayPal integration via the Orders v2 REST API (no SDK dependency)

mod custom_id;

pub use custom_id::{CustomId, CustomIdError};

use http::HeaderMap;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use shared::money::format_amount;

/// Seconds shaved off the token lifetime so it is never used right at expiry
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum PayPalError {
    #[error("PayPal http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("PayPal returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("PayPal response missing {0}")]
    MissingField(&'static str),
}

/// PayPal order waiting for buyer approval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedOrder {
    pub id: String,
    pub approval_url: String,
}

/// Outcome of capturing an approved order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    /// Order status after capture, `COMPLETED` on success
    pub status: String,
    /// Captured amount, when PayPal reports one
    pub amount: Option<Decimal>,
}

impl CaptureResult {
    pub fn is_completed(&self) -> bool {
        self.status == "COMPLETED"
    }
}

/// Transmission headers PayPal sends with every webhook delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookHeaders {
    pub transmission_id: String,
    pub transmission_time: String,
    pub transmission_sig: String,
    pub cert_url: String,
    pub auth_algo: String,
}

impl WebhookHeaders {
    /// `None` if any of the signature headers is missing
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(String::from)
        };
        Some(Self {
            transmission_id: get("paypal-transmission-id")?,
            transmission_time: get("paypal-transmission-time")?,
            transmission_sig: get("paypal-transmission-sig")?,
            cert_url: get("paypal-cert-url")?,
            auth_algo: get("paypal-auth-algo")?,
        })
    }
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// PayPal REST client with a cached OAuth token
#[derive(Clone)]
pub struct PayPalClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    webhook_id: String,
    currency: String,
    return_url: String,
    cancel_url: String,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl PayPalClient {
    pub fn new(config: &crate::config::Config) -> Result<Self, PayPalError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: config.paypal_api_base.trim_end_matches('/').to_string(),
            client_id: config.paypal_client_id.clone(),
            client_secret: config.paypal_client_secret.clone(),
            webhook_id: config.paypal_webhook_id.clone(),
            currency: config.paypal_currency.clone(),
            return_url: config.paypal_return_url.clone(),
            cancel_url: config.paypal_cancel_url.clone(),
            token: Arc::new(Mutex::new(None)),
        })
    }

    async fn read_json(resp: reqwest::Response) -> Result<Value, PayPalError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PayPalError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    /// OAuth2 client-credentials token, reused until shortly before it expires
    async fn access_token(&self) -> Result<String, PayPalError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && token.expires_at > Instant::now()
        {
            return Ok(token.value.clone());
        }

        let resp = self
            .http
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let body = Self::read_json(resp).await?;

        let value = body["access_token"]
            .as_str()
            .ok_or(PayPalError::MissingField("access_token"))?
            .to_string();
        let expires_in = body["expires_in"].as_u64().unwrap_or(300);
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now()
                + Duration::from_secs(expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS)),
        });
        Ok(value)
    }

    /// Create a CAPTURE-intent order for `amount`, tagged with `custom_id`
    pub async fn create_order(
        &self,
        amount: Decimal,
        custom_id: &CustomId,
    ) -> Result<CreatedOrder, PayPalError> {
        let token = self.access_token().await?;
        let body = order_request(
            amount,
            &self.currency,
            custom_id,
            &self.return_url,
            &self.cancel_url,
        );
        let resp = self
            .http
            .post(format!("{}/v2/checkout/orders", self.base_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let order = Self::read_json(resp).await?;

        let id = order["id"]
            .as_str()
            .ok_or(PayPalError::MissingField("id"))?
            .to_string();
        let approval_url = approval_link(&order).ok_or(PayPalError::MissingField("approve link"))?;
        tracing::info!(paypal_order_id = %id, custom_id = %custom_id, "PayPal order created");
        Ok(CreatedOrder { id, approval_url })
    }

    /// Capture an approved order. Idempotent on PayPal's side per order id.
    pub async fn capture_order(&self, order_id: &str) -> Result<CaptureResult, PayPalError> {
        let token = self.access_token().await?;
        let resp = self
            .http
            .post(format!(
                "{}/v2/checkout/orders/{order_id}/capture",
                self.base_url
            ))
            .bearer_auth(token)
            .header("PayPal-Request-Id", format!("capture-{order_id}"))
            .json(&json!({}))
            .send()
            .await?;
        let body = Self::read_json(resp).await?;
        capture_result(&body)
    }

    /// Ask PayPal whether a webhook delivery is authentic.
    ///
    /// `raw_event` must be the body exactly as received; re-serialized JSON
    /// does not verify.
    pub async fn verify_webhook_signature(
        &self,
        headers: &WebhookHeaders,
        raw_event: &str,
    ) -> Result<bool, PayPalError> {
        let token = self.access_token().await?;
        let body = verification_request(headers, &self.webhook_id, raw_event);
        let resp = self
            .http
            .post(format!(
                "{}/v1/notifications/verify-webhook-signature",
                self.base_url
            ))
            .bearer_auth(token)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let result = Self::read_json(resp).await?;
        Ok(result["verification_status"].as_str() == Some("SUCCESS"))
    }
}

fn order_request(
    amount: Decimal,
    currency: &str,
    custom_id: &CustomId,
    return_url: &str,
    cancel_url: &str,
) -> Value {
    json!({
        "intent": "CAPTURE",
        "purchase_units": [{
            "custom_id": custom_id.to_string(),
            "amount": {
                "currency_code": currency,
                "value": format_amount(amount),
            },
        }],
        "payment_source": {
            "paypal": {
                "experience_context": {
                    "return_url": return_url,
                    "cancel_url": cancel_url,
                    "user_action": "PAY_NOW",
                },
            },
        },
    })
}

/// Link the buyer must open to approve the order
pub fn approval_link(order: &Value) -> Option<String> {
    order["links"]
        .as_array()?
        .iter()
        .find(|link| matches!(link["rel"].as_str(), Some("approve" | "payer-action")))
        .and_then(|link| link["href"].as_str())
        .map(String::from)
}

fn capture_result(body: &Value) -> Result<CaptureResult, PayPalError> {
    let status = body["status"]
        .as_str()
        .ok_or(PayPalError::MissingField("status"))?
        .to_string();
    let amount = body["purchase_units"][0]["payments"]["captures"][0]["amount"]["value"]
        .as_str()
        .and_then(|v| Decimal::from_str(v).ok());
    Ok(CaptureResult { status, amount })
}

/// JSON body for verify-webhook-signature with the raw event spliced in verbatim
fn verification_request(headers: &WebhookHeaders, webhook_id: &str, raw_event: &str) -> String {
    let field = |v: &str| Value::String(v.to_string()).to_string();
    format!(
        r#"{{"auth_algo":{},"cert_url":{},"transmission_id":{},"transmission_sig":{},"transmission_time":{},"webhook_id":{},"webhook_event":{}}}"#,
        field(&headers.auth_algo),
        field(&headers.cert_url),
        field(&headers.transmission_id),
        field(&headers.transmission_sig),
        field(&headers.transmission_time),
        field(webhook_id),
        raw_event,
    )
}

/// `custom_id` of the first purchase unit of an order resource
pub fn resource_custom_id(resource: &Value) -> Option<&str> {
    resource["purchase_units"][0]["custom_id"]
        .as_str()
        .or_else(|| resource["custom_id"].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers() -> WebhookHeaders {
        WebhookHeaders {
            transmission_id: "tx-1".into(),
            transmission_time: "2026-01-01T00:00:00Z".into(),
            transmission_sig: "c2ln".into(),
            cert_url: "https://api.paypal.com/cert.pem".into(),
            auth_algo: "SHA256withRSA".into(),
        }
    }

    #[test]
    fn test_webhook_headers_from_header_map() {
        let mut map = HeaderMap::new();
        map.insert("PAYPAL-TRANSMISSION-ID", HeaderValue::from_static("tx-1"));
        map.insert(
            "PAYPAL-TRANSMISSION-TIME",
            HeaderValue::from_static("2026-01-01T00:00:00Z"),
        );
        map.insert("PAYPAL-TRANSMISSION-SIG", HeaderValue::from_static("c2ln"));
        map.insert(
            "PAYPAL-CERT-URL",
            HeaderValue::from_static("https://api.paypal.com/cert.pem"),
        );
        assert!(WebhookHeaders::from_headers(&map).is_none());

        map.insert("PAYPAL-AUTH-ALGO", HeaderValue::from_static("SHA256withRSA"));
        assert_eq!(WebhookHeaders::from_headers(&map), Some(headers()));
    }

    #[test]
    fn test_empty_header_counts_as_missing() {
        let mut map = HeaderMap::new();
        for name in [
            "paypal-transmission-id",
            "paypal-transmission-time",
            "paypal-transmission-sig",
            "paypal-cert-url",
        ] {
            map.insert(name, HeaderValue::from_static("x"));
        }
        map.insert("paypal-auth-algo", HeaderValue::from_static(""));
        assert!(WebhookHeaders::from_headers(&map).is_none());
    }

    #[test]
    fn test_approval_link_accepts_both_rels() {
        let legacy = json!({"links": [
            {"rel": "self", "href": "https://api/self"},
            {"rel": "approve", "href": "https://paypal/approve"}
        ]});
        assert_eq!(approval_link(&legacy).as_deref(), Some("https://paypal/approve"));

        let payer_action = json!({"links": [
            {"rel": "payer-action", "href": "https://paypal/checkoutnow"}
        ]});
        assert_eq!(
            approval_link(&payer_action).as_deref(),
            Some("https://paypal/checkoutnow")
        );

        assert!(approval_link(&json!({"links": [{"rel": "self", "href": "x"}]})).is_none());
        assert!(approval_link(&json!({})).is_none());
    }

    #[test]
    fn test_order_request_body() {
        let custom_id = CustomId::AddBalance {
            amount: Decimal::new(2500, 2),
            user_id: "u1".into(),
        };
        let body = order_request(
            Decimal::new(2500, 2),
            "PLN",
            &custom_id,
            "https://shop/ok",
            "https://shop/cancel",
        );
        assert_eq!(body["intent"], "CAPTURE");
        assert_eq!(body["purchase_units"][0]["amount"]["value"], "25.00");
        assert_eq!(body["purchase_units"][0]["amount"]["currency_code"], "PLN");
        assert_eq!(body["purchase_units"][0]["custom_id"], "AddBalance:25.00:u1");
        assert_eq!(
            body["payment_source"]["paypal"]["experience_context"]["return_url"],
            "https://shop/ok"
        );
    }

    #[test]
    fn test_capture_result_parsing() {
        let body = json!({
            "id": "5O190127TN364715T",
            "status": "COMPLETED",
            "purchase_units": [{
                "payments": {"captures": [{"amount": {"currency_code": "PLN", "value": "40.18"}}]}
            }]
        });
        let result = capture_result(&body).unwrap();
        assert!(result.is_completed());
        assert_eq!(result.amount, Some(Decimal::new(4018, 2)));

        let pending = capture_result(&json!({"status": "PAYER_ACTION_REQUIRED"})).unwrap();
        assert!(!pending.is_completed());
        assert_eq!(pending.amount, None);

        assert!(matches!(
            capture_result(&json!({})),
            Err(PayPalError::MissingField("status"))
        ));
    }

    #[test]
    fn test_verification_request_keeps_raw_event() {
        let raw = r#"{"id":"WH-1","event_type":"CHECKOUT.ORDER.APPROVED","z":1,"a":2}"#;
        let body = verification_request(&headers(), "WH-ID", raw);
        assert!(body.ends_with(&format!(r#""webhook_event":{raw}}}"#)));

        let parsed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["webhook_id"], "WH-ID");
        assert_eq!(parsed["auth_algo"], "SHA256withRSA");
        assert_eq!(parsed["webhook_event"]["event_type"], "CHECKOUT.ORDER.APPROVED");
    }

    #[test]
    fn test_resource_custom_id() {
        let order = json!({"purchase_units": [{"custom_id": "AddBalance:5.00:u1"}]});
        assert_eq!(resource_custom_id(&order), Some("AddBalance:5.00:u1"));

        let capture = json!({"custom_id": "CartPayment:5.00:u1"});
        assert_eq!(resource_custom_id(&capture), Some("CartPayment:5.00:u1"));

        assert_eq!(resource_custom_id(&json!({"purchase_units": []})), None);
    }
}
