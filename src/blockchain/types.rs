//! Explorer wire types and error definitions.

use serde::Deserialize;
use thiserror::Error;

// Re-export ExplorerConfig from config module to avoid duplication
pub use crate::config::schema::ExplorerConfig;

use crate::payments::{Output, Transaction};

/// Errors that can occur while reading from the explorer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExplorerError {
    /// The explorer does not know the requested resource.
    #[error("{0} not found")]
    NotFound(String),

    /// The explorer throttled us.
    #[error("Explorer rate limit exceeded")]
    RateLimited,

    /// The explorer answered with an error or an unreadable body.
    #[error("Explorer unavailable: {0}")]
    Unavailable(String),

    /// Request timed out.
    #[error("Explorer request timed out after {0} seconds")]
    Timeout(u64),

    /// Could not reach the explorer at all.
    #[error("Explorer connection failed: {0}")]
    Connection(String),

    /// A configured explorer URL is unusable.
    #[error("Invalid explorer endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ExplorerError {
    /// Wire code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            ExplorerError::NotFound(_) => "NOT_FOUND",
            ExplorerError::RateLimited => "RATE_LIMITED",
            ExplorerError::Unavailable(_) | ExplorerError::InvalidEndpoint(_) => "UNAVAILABLE",
            ExplorerError::Timeout(_) => "TIMEOUT",
            ExplorerError::Connection(_) => "CONNECTION_ERROR",
        }
    }

    /// Whether another explorer instance might answer differently.
    pub fn should_failover(&self) -> bool {
        !matches!(self, ExplorerError::NotFound(_) | ExplorerError::InvalidEndpoint(_))
    }
}

/// Result type for explorer operations.
pub type ExplorerResult<T> = Result<T, ExplorerError>;

/// `GET /api/v1/transactions/{id}` response body (fields we use).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerTransaction {
    pub id: String,
    #[serde(default)]
    pub num_confirmations: u32,
    #[serde(default)]
    pub outputs: Vec<ExplorerOutput>,
}

/// Output box as reported by the explorer.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerOutput {
    pub address: String,
    pub value: u64,
}

impl From<ExplorerTransaction> for Transaction {
    fn from(tx: ExplorerTransaction) -> Self {
        Transaction::new(
            tx.id,
            tx.num_confirmations,
            tx.outputs
                .into_iter()
                .map(|o| Output::new(o.address, o.value))
                .collect(),
        )
    }
}

/// `GET /api/v1/networkState` response body (fields we use).
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkState {
    pub height: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explorer_transaction_conversion() {
        let body = r#"{
            "id": "ab12",
            "blockId": "ff00",
            "numConfirmations": 7,
            "inputs": [],
            "outputs": [
                {"boxId": "b1", "address": "9fMerchant", "value": 2000000000, "assets": []},
                {"boxId": "b2", "address": "9fChange", "value": 7998900000}
            ]
        }"#;
        let parsed: ExplorerTransaction = serde_json::from_str(body).unwrap();
        let tx: Transaction = parsed.into();

        assert_eq!(tx.id, "ab12");
        assert_eq!(tx.confirmations, 7);
        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.outputs[0], Output::new("9fMerchant", 2_000_000_000));
    }

    #[test]
    fn test_missing_confirmations_defaults_to_zero() {
        let parsed: ExplorerTransaction = serde_json::from_str(r#"{"id": "ab12"}"#).unwrap();
        let tx = Transaction::from(parsed);
        assert_eq!(tx.confirmations, 0);
        assert!(tx.outputs.is_empty());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ExplorerError::NotFound("x".into()).code(), "NOT_FOUND");
        assert_eq!(ExplorerError::RateLimited.code(), "RATE_LIMITED");
        assert_eq!(ExplorerError::Timeout(5).code(), "TIMEOUT");
        assert_eq!(ExplorerError::Connection("refused".into()).code(), "CONNECTION_ERROR");
        assert_eq!(ExplorerError::Unavailable("502".into()).code(), "UNAVAILABLE");
    }

    #[test]
    fn test_error_display() {
        let err = ExplorerError::Timeout(10);
        assert_eq!(err.to_string(), "Explorer request timed out after 10 seconds");
        assert!(!ExplorerError::NotFound("transaction ab".into()).should_failover());
        assert!(ExplorerError::RateLimited.should_failover());
    }
}
