//! Payment verification types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::payments::units::{to_smallest_units, UnitError};

/// A single output box of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    /// Recipient address, compared byte-for-byte.
    pub recipient: String,
    /// Value in nanoERG.
    pub value: u64,
}

impl Output {
    pub fn new(recipient: impl Into<String>, value: u64) -> Self {
        Self {
            recipient: recipient.into(),
            value,
        }
    }
}

/// Snapshot of a transaction as reported by the explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction id.
    pub id: String,
    /// Blocks observed on top of the including block.
    pub confirmations: u32,
    /// Outputs in the order the transaction lists them.
    pub outputs: Vec<Output>,
}

impl Transaction {
    pub fn new(id: impl Into<String>, confirmations: u32, outputs: Vec<Output>) -> Self {
        Self {
            id: id.into(),
            confirmations,
            outputs,
        }
    }
}

/// A strictly positive, finite amount a merchant expects to receive.
///
/// Holds both the amount as submitted and its floor conversion to nanoERG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpectedAmount {
    human: f64,
    units: u128,
}

impl ExpectedAmount {
    /// Validate and convert an ERG amount.
    pub fn new(human: f64) -> Result<Self, UnitError> {
        if !human.is_finite() {
            return Err(UnitError::InvalidAmount(format!(
                "{human} is not a finite number"
            )));
        }
        if human <= 0.0 {
            return Err(UnitError::InvalidAmount(format!(
                "{human} is not greater than zero"
            )));
        }
        let units = to_smallest_units(human)?;
        Ok(Self { human, units })
    }

    /// The amount in ERG as submitted.
    pub fn human(&self) -> f64 {
        self.human
    }

    /// The amount in nanoERG, truncated.
    pub fn units(&self) -> u128 {
        self.units
    }
}

/// A validated verification request.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationRequest {
    pub tx_id: String,
    pub recipient: String,
    pub amount: ExpectedAmount,
}

/// Why a transaction does not satisfy a payment request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    /// Not enough blocks on top of the transaction yet.
    #[error("Transaction has {current} confirmation(s), {required} required")]
    InsufficientConfirmations { required: u32, current: u32 },

    /// No output pays the expected address.
    #[error("Transaction does not pay {expected_recipient}")]
    WrongRecipient { expected_recipient: String },

    /// The first output to the expected address carries too little value.
    #[error("Received {received_human} ERG, expected at least {expected_human} ERG")]
    AmountTooLow {
        expected_human: f64,
        received_human: String,
    },
}

impl Rejection {
    /// Wire code for this rejection.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::InsufficientConfirmations { .. } => "INSUFFICIENT_CONFIRMATIONS",
            Rejection::WrongRecipient { .. } => "WRONG_RECIPIENT",
            Rejection::AmountTooLow { .. } => "AMOUNT_TOO_LOW",
        }
    }
}

/// Result of evaluating a transaction against a payment request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Verified {
        confirmations: u32,
        /// Value of the matched output in ERG, 9 decimals.
        received_amount: String,
    },
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, Outcome::Verified { .. })
    }

    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Verified { .. } => "verified",
            Outcome::Rejected(rejection) => rejection.code(),
        }
    }
}
