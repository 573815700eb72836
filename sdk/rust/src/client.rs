use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Successful verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verified {
    pub verified: bool,
    pub tx_id: String,
    pub confirmations: u32,
    pub received_amount: String,
    pub message: String,
}

/// The `error` member of a failure body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

/// Result of `verify_payment`. Rejections are answers, not transport errors.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyResponse {
    Verified(Verified),
    Failed { status: u16, error: ApiErrorBody },
}

impl VerifyResponse {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerifyResponse::Verified(_))
    }

    /// Error code when the payment was not verified.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            VerifyResponse::Verified(_) => None,
            VerifyResponse::Failed { error, .. } => Some(&error.code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub recipient: String,
    pub amount: String,
    pub amount_nano_erg: String,
    pub min_confirmations: u32,
    pub network: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySettings {
    pub min_confirmations: u32,
    pub decimals: usize,
    pub network: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: String,
    pub service: String,
    #[serde(default)]
    pub explorer_height: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Health {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway returned {status}: {} ({})", .error.message, .error.code)]
    Api { status: u16, error: ApiErrorBody },

    #[error("Unexpected response ({status}): {body}")]
    Decode { status: u16, body: String },
}

pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Use a preconfigured `reqwest::Client` (timeouts, proxies).
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Ask the gateway whether `tx_id` pays `merchant_address` at least `expected_amount` ERG.
    pub async fn verify_payment(
        &self,
        tx_id: &str,
        merchant_address: &str,
        expected_amount: f64,
    ) -> Result<VerifyResponse, SdkError> {
        let resp = self
            .client
            .post(format!("{}/api/verify-payment", self.base_url))
            .json(&json!({
                "txId": tx_id,
                "merchantAddress": merchant_address,
                "expectedAmount": expected_amount,
            }))
            .send()
            .await?;

        match decode::<Verified>(resp).await {
            Ok(verified) => Ok(VerifyResponse::Verified(verified)),
            Err(SdkError::Api { status, error }) => Ok(VerifyResponse::Failed { status, error }),
            Err(e) => Err(e),
        }
    }

    /// Normalize a merchant address and amount into a payment request.
    pub async fn create_payment_request(
        &self,
        merchant_address: &str,
        amount: f64,
    ) -> Result<PaymentRequest, SdkError> {
        let resp = self
            .client
            .post(format!("{}/api/payment-request", self.base_url))
            .json(&json!({ "merchantAddress": merchant_address, "amount": amount }))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn config(&self) -> Result<GatewaySettings, SdkError> {
        let resp = self
            .client
            .get(format!("{}/api/config", self.base_url))
            .send()
            .await?;
        decode(resp).await
    }

    /// Gateway health. A degraded gateway (503) is still a valid answer.
    pub async fn health(&self) -> Result<Health, SdkError> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if status.is_success() || status == StatusCode::SERVICE_UNAVAILABLE {
            if let Ok(health) = serde_json::from_str::<Health>(&text) {
                return Ok(health);
            }
        }
        Err(SdkError::Decode {
            status: status.as_u16(),
            body: text,
        })
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, SdkError> {
    let status = resp.status();
    let text = resp.text().await?;

    if status.is_success() {
        return serde_json::from_str(&text).map_err(|_| SdkError::Decode {
            status: status.as_u16(),
            body: text,
        });
    }

    match serde_json::from_str::<ErrorEnvelope>(&text) {
        Ok(envelope) => Err(SdkError::Api {
            status: status.as_u16(),
            error: envelope.error,
        }),
        Err(_) => Err(SdkError::Decode {
            status: status.as_u16(),
            body: text,
        }),
    }
}
