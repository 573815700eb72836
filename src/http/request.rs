//! Request bodies and request identification.
//!
//! # Responsibilities
//! - Define the JSON bodies accepted by each endpoint
//! - Read the request ID assigned by the request-id layer
//!
//! # Design Decisions
//! - Every field is optional at the serde level so that a missing field is
//!   reported as `INVALID_REQUEST` with the field name, not as a serde error
//! - Amounts stay raw JSON until validation (number or numeric string)

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID set by `SetRequestIdLayer`, or `"-"` when absent.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

/// `POST /api/verify-payment`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentBody {
    pub tx_id: Option<String>,
    pub merchant_address: Option<String>,
    pub expected_amount: Option<Value>,
}

/// `POST /api/payment-request`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestBody {
    pub merchant_address: Option<String>,
    pub amount: Option<Value>,
}
