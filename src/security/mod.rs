//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (CORS preflight / headers)
//!     → rate_limit.rs (check per-IP limits)
//!     → limits.rs (JSON body size)
//!     → handlers
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - No trust in client input; handlers validate shape before any explorer call

pub mod limits;
pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, RateLimiter};
