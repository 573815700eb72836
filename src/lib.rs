//! Ergo payment verification gateway library.
//!
//! Confirms that an on-chain Ergo transaction pays a merchant address at
//! least an expected amount with enough confirmations.

pub mod blockchain;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod payments;
pub mod security;

pub use config::schema::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use payments::{Outcome, PaymentVerifier, Rejection};
