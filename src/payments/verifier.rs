//! Payment-matching predicate.
//!
//! Decides whether a fetched transaction satisfies a merchant's payment
//! request. Checks run in a fixed order and the first failing check decides
//! the rejection:
//!
//! ```text
//! confirmations >= minimum?      no → InsufficientConfirmations
//!     → first output to recipient?   no → WrongRecipient
//!     → value >= expected nanoERG?   no → AmountTooLow
//!     → Verified
//! ```
//!
//! Only the first output paying the recipient is considered, even when a later
//! output to the same address would satisfy the request.

use crate::payments::types::{ExpectedAmount, Outcome, Rejection, Transaction};
use crate::payments::units::to_human_units;

/// Default number of confirmations a payment needs.
pub const DEFAULT_MIN_CONFIRMATIONS: u32 = 1;

/// Stateless payment verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentVerifier {
    min_confirmations: u32,
}

impl PaymentVerifier {
    /// Create a verifier requiring `min_confirmations` blocks of depth.
    pub fn new(min_confirmations: u32) -> Self {
        Self { min_confirmations }
    }

    pub fn min_confirmations(&self) -> u32 {
        self.min_confirmations
    }

    /// Evaluate `tx` against an expected recipient and amount.
    pub fn verify(&self, tx: &Transaction, recipient: &str, expected: &ExpectedAmount) -> Outcome {
        if tx.confirmations < self.min_confirmations {
            return Outcome::Rejected(Rejection::InsufficientConfirmations {
                required: self.min_confirmations,
                current: tx.confirmations,
            });
        }

        let Some(output) = tx.outputs.iter().find(|o| o.recipient == recipient) else {
            return Outcome::Rejected(Rejection::WrongRecipient {
                expected_recipient: recipient.to_string(),
            });
        };

        let received = u128::from(output.value);
        if received < expected.units() {
            return Outcome::Rejected(Rejection::AmountTooLow {
                expected_human: expected.human(),
                received_human: to_human_units(received),
            });
        }

        Outcome::Verified {
            confirmations: tx.confirmations,
            received_amount: to_human_units(received),
        }
    }
}

impl Default for PaymentVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONFIRMATIONS)
    }
}
