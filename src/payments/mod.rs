//! Payment verification subsystem.
//!
//! # Data Flow
//! ```text
//! Transaction snapshot (from blockchain::client)
//!     + validated VerificationRequest (from http::validation)
//!     → verifier.rs (confirmation gate, recipient scan, amount check)
//!     → Outcome (Verified | Rejected)
//! ```
//!
//! `units.rs` is the only arithmetic: ERG ↔ nanoERG at a fixed scale of 10^9.

pub mod types;
pub mod units;
pub mod verifier;

pub use types::{ExpectedAmount, Outcome, Output, Rejection, Transaction, VerificationRequest};
pub use verifier::PaymentVerifier;
