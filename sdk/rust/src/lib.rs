//! Typed client for the Ergo payment verification gateway.

mod client;

pub use client::{
    ApiErrorBody, GatewayClient, GatewaySettings, Health, PaymentRequest, SdkError, Verified,
    VerifyResponse,
};
