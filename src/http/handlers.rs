//! Endpoint handlers.
//!
//! # Responsibilities
//! - Validate bodies into typed requests
//! - Fetch from the explorer and run the verifier
//! - Serialize outcomes and record verification metrics

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::http::request::{request_id, PaymentRequestBody, VerifyPaymentBody};
use crate::http::response::{
    ApiError, ConfigResponse, HealthResponse, PaymentRequestResponse, VerifiedResponse,
};
use crate::http::server::AppState;
use crate::http::validation::PaymentRequest;
use crate::observability::metrics;
use crate::payments::units::{to_human_units, DECIMALS};
use crate::payments::{Outcome, VerificationRequest};

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "ergopay-gateway";

/// `POST /api/verify-payment`
pub async fn verify_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<VerifyPaymentBody>, JsonRejection>,
) -> Result<Json<VerifiedResponse>, ApiError> {
    let request_id = request_id(&headers);
    let Json(body) = payload?;
    let request = VerificationRequest::try_from(body).inspect_err(|e| {
        tracing::debug!(request_id = %request_id, code = e.code(), error = %e, "Rejected verification input");
    })?;

    let tx = match state.explorer.get_transaction(&request.tx_id).await {
        Ok(tx) => tx,
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                tx_id = %request.tx_id,
                code = e.code(),
                error = %e,
                "Explorer lookup failed"
            );
            metrics::record_verification(e.code());
            return Err(e.into());
        }
    };

    let outcome = state
        .verifier
        .verify(&tx, &request.recipient, &request.amount);
    metrics::record_verification(outcome.label());

    match outcome {
        Outcome::Verified {
            confirmations,
            received_amount,
        } => {
            tracing::info!(
                request_id = %request_id,
                tx_id = %request.tx_id,
                confirmations,
                received = %received_amount,
                "Payment verified"
            );
            Ok(Json(VerifiedResponse {
                verified: true,
                tx_id: request.tx_id,
                confirmations,
                received_amount,
                message: "Payment verified".to_string(),
            }))
        }
        Outcome::Rejected(rejection) => {
            tracing::info!(
                request_id = %request_id,
                tx_id = %request.tx_id,
                code = rejection.code(),
                reason = %rejection,
                "Payment rejected"
            );
            Err(rejection.into())
        }
    }
}

/// `POST /api/payment-request`
pub async fn payment_request(
    State(state): State<AppState>,
    payload: Result<Json<PaymentRequestBody>, JsonRejection>,
) -> Result<Json<PaymentRequestResponse>, ApiError> {
    let Json(body) = payload?;
    let request = PaymentRequest::try_from(body)?;
    let units = request.amount.units();

    Ok(Json(PaymentRequestResponse {
        recipient: request.recipient,
        amount: to_human_units(units),
        amount_nano_erg: units.to_string(),
        min_confirmations: state.verifier.min_confirmations(),
        network: state.config.explorer.network.clone(),
    }))
}

/// `GET /api/config`
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        min_confirmations: state.verifier.min_confirmations(),
        decimals: DECIMALS,
        network: state.config.explorer.network.clone(),
    })
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Response {
    match state.explorer.get_height().await {
        Ok(height) => {
            metrics::record_explorer_health(true);
            Json(HealthResponse {
                status: "ok".to_string(),
                service: SERVICE_NAME.to_string(),
                explorer_height: Some(height),
                error: None,
            })
            .into_response()
        }
        Err(e) => {
            metrics::record_explorer_health(false);
            tracing::warn!(error = %e, "Explorer unreachable during health check");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded".to_string(),
                    service: SERVICE_NAME.to_string(),
                    explorer_height: None,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Fallback for unknown routes.
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::RouteNotFound(format!("{method} {}", uri.path()))
}
