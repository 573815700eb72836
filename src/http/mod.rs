//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (JSON bodies, request ID)
//!     → validation.rs (shape checks, typed requests)
//!     → handlers.rs (explorer fetch + verifier)
//!     → response.rs (success bodies, error envelope)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;
pub mod validation;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{AppState, GatewayServer};
