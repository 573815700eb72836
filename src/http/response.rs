//! Response bodies and error mapping.
//!
//! # Responsibilities
//! - Define the success bodies for each endpoint
//! - Map every failure (validation, rejection, explorer) to the standard
//!   `{ success: false, error: { code, message, details? } }` envelope
//! - Choose the HTTP status for each error code
//!
//! # Design Decisions
//! - Business rejections are not server faults: 402/409, never 5xx
//! - Explorer failures keep their own code (NOT_FOUND, TIMEOUT, ...)

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::blockchain::ExplorerError;
use crate::payments::Rejection;

/// Body returned when a payment is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedResponse {
    pub verified: bool,
    pub tx_id: String,
    pub confirmations: u32,
    pub received_amount: String,
    pub message: String,
}

/// Normalized payment request handed to the wallet signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestResponse {
    pub recipient: String,
    /// ERG, 9 decimals.
    pub amount: String,
    /// nanoERG as a decimal string.
    pub amount_nano_erg: String,
    pub min_confirmations: u32,
    pub network: String,
}

/// Public settings for the checkout widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub min_confirmations: u32,
    pub decimals: usize,
    pub network: String,
}

/// `GET /health` body. `explorer_height` is absent when degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_height: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The `error` member of a failure body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Failure body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

/// Every way a request can fail.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    InvalidAddress(String),

    #[error("{0}")]
    InvalidAmount(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Too many requests, retry later")]
    RateLimited,

    /// The gateway's own request deadline elapsed.
    #[error("Request timed out after {0}s")]
    RequestTimeout(u64),

    #[error("No route for {0}")]
    RouteNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Explorer(#[from] ExplorerError),
}

impl ApiError {
    /// Wire code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::InvalidAddress(_) => "INVALID_ADDRESS",
            ApiError::InvalidAmount(_) => "INVALID_AMOUNT",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::RateLimited => "RATE_LIMITED",
            ApiError::RequestTimeout(_) => "TIMEOUT",
            ApiError::RouteNotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Rejected(rejection) => rejection.code(),
            ApiError::Explorer(err) => err.code(),
        }
    }

    /// HTTP status.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_)
            | ApiError::InvalidAddress(_)
            | ApiError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::RequestTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Rejected(Rejection::InsufficientConfirmations { .. }) => StatusCode::CONFLICT,
            ApiError::Rejected(_) => StatusCode::PAYMENT_REQUIRED,
            ApiError::Explorer(err) => match err {
                ExplorerError::NotFound(_) => StatusCode::NOT_FOUND,
                ExplorerError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                ExplorerError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                ExplorerError::Connection(_) => StatusCode::BAD_GATEWAY,
                ExplorerError::Unavailable(_) | ExplorerError::InvalidEndpoint(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
            },
        }
    }

    /// Structured fields for rejections.
    pub fn details(&self) -> Option<Value> {
        match self {
            ApiError::Rejected(Rejection::InsufficientConfirmations { required, current }) => {
                Some(json!({ "required": required, "current": current }))
            }
            ApiError::Rejected(Rejection::WrongRecipient { expected_recipient }) => {
                Some(json!({ "expectedRecipient": expected_recipient }))
            }
            ApiError::Rejected(Rejection::AmountTooLow {
                expected_human,
                received_human,
            }) => Some(json!({
                "expectedAmount": expected_human,
                "receivedAmount": received_human,
            })),
            _ => None,
        }
    }

    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.to_string(),
                details: self.details(),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::InvalidRequest(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_envelope())).into_response()
    }
}
