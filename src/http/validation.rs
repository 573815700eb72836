//! Shape validation for incoming request bodies.
//!
//! Nothing here talks to the explorer: a request that fails these checks is
//! answered without any upstream call.

use serde_json::Value;

use crate::http::request::{PaymentRequestBody, VerifyPaymentBody};
use crate::http::response::ApiError;
use crate::payments::{ExpectedAmount, VerificationRequest};

/// Explorer transaction ids are 32-byte hashes in hex.
pub const TX_ID_LEN: usize = 64;

/// Bounds for a base58 Ergo address (P2PK addresses are 51 chars, P2S can be long).
pub const MIN_ADDRESS_LEN: usize = 30;
pub const MAX_ADDRESS_LEN: usize = 1024;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

pub fn validate_tx_id(tx_id: Option<&str>) -> Result<String, ApiError> {
    let tx_id = match tx_id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(ApiError::InvalidRequest("txId is required".into())),
    };
    if tx_id.len() != TX_ID_LEN || !tx_id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ApiError::InvalidRequest(format!(
            "txId must be {TX_ID_LEN} hexadecimal characters"
        )));
    }
    Ok(tx_id.to_string())
}

/// Structural check only. The address is passed on untouched (no trimming).
pub fn validate_address(field: &str, address: Option<&str>) -> Result<String, ApiError> {
    let address = match address {
        Some(a) if !a.is_empty() => a,
        _ => return Err(ApiError::InvalidRequest(format!("{field} is required"))),
    };
    let len_ok = (MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&address.len());
    if !len_ok || !address.chars().all(|c| BASE58_ALPHABET.contains(c)) {
        return Err(ApiError::InvalidAddress(format!(
            "{field} is not a valid Ergo address"
        )));
    }
    Ok(address.to_string())
}

/// Accepts a JSON number or a numeric string.
pub fn validate_amount(field: &str, amount: Option<&Value>) -> Result<ExpectedAmount, ApiError> {
    let human = match amount {
        None | Some(Value::Null) => {
            return Err(ApiError::InvalidRequest(format!("{field} is required")))
        }
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    let human = human.ok_or_else(|| {
        ApiError::InvalidAmount(format!("{field} must be a number"))
    })?;
    ExpectedAmount::new(human)
        .map_err(|_| ApiError::InvalidAmount(format!("{field} must be a positive finite number")))
}

impl TryFrom<VerifyPaymentBody> for VerificationRequest {
    type Error = ApiError;

    fn try_from(body: VerifyPaymentBody) -> Result<Self, Self::Error> {
        let tx_id = validate_tx_id(body.tx_id.as_deref())?;
        let recipient = validate_address("merchantAddress", body.merchant_address.as_deref())?;
        let amount = validate_amount("expectedAmount", body.expected_amount.as_ref())?;
        Ok(VerificationRequest {
            tx_id,
            recipient,
            amount,
        })
    }
}

/// Validated `POST /api/payment-request` input.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub recipient: String,
    pub amount: ExpectedAmount,
}

impl TryFrom<PaymentRequestBody> for PaymentRequest {
    type Error = ApiError;

    fn try_from(body: PaymentRequestBody) -> Result<Self, Self::Error> {
        let recipient = validate_address("merchantAddress", body.merchant_address.as_deref())?;
        let amount = validate_amount("amount", body.amount.as_ref())?;
        // Below one nanoERG there is nothing a wallet can send
        if amount.units() == 0 {
            return Err(ApiError::InvalidAmount(
                "amount is smaller than 1 nanoERG".into(),
            ));
        }
        Ok(PaymentRequest { recipient, amount })
    }
}
