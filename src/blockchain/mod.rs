//! Blockchain data source subsystem.
//!
//! # Data Flow
//! ```text
//! Transaction id (validated by http::validation)
//!     → client.rs (explorer REST call with timeout + failover)
//!     → types.rs (explorer JSON → payments::Transaction)
//!     → payments::verifier
//! ```
//!
//! # Constraints
//! - Read-only: nothing here builds, signs or broadcasts transactions
//! - Every explorer call has a deadline
//! - Not-found, throttling, outage, timeout and connection failures stay
//!   distinguishable all the way to the HTTP response

pub mod client;
pub mod types;

pub use client::ExplorerClient;
pub use types::{ExplorerConfig, ExplorerError, ExplorerResult};
