//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, timeout, limits)
//! - Bind server to listener and drain on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    error_handling::HandleErrorLayer,
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    BoxError, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::blockchain::{ExplorerClient, ExplorerError};
use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::response::ApiError;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;
use crate::payments::PaymentVerifier;
use crate::security::limits::{body_limit, cors_layer};
use crate::security::{rate_limit_middleware, RateLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub verifier: PaymentVerifier,
    pub explorer: Arc<ExplorerClient>,
    pub config: Arc<GatewayConfig>,
}

/// HTTP server for the verification API.
pub struct GatewayServer {
    router: Router,
    state: AppState,
}

impl GatewayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ExplorerError> {
        let explorer = Arc::new(ExplorerClient::new(config.explorer.clone())?);
        let verifier = PaymentVerifier::new(config.verification.min_confirmations);
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        let config = Arc::new(config);

        let state = AppState {
            verifier,
            explorer,
            config: config.clone(),
        };

        let router = Self::build_router(&config, state.clone(), limiter);
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState, limiter: Arc<RateLimiter>) -> Router {
        let request_secs = config.timeouts.request_secs;

        Router::new()
            .route("/api/verify-payment", post(handlers::verify_payment))
            .route("/api/payment-request", post(handlers::payment_request))
            .route("/api/config", get(handlers::get_config))
            .route("/health", get(handlers::health))
            .fallback(handlers::not_found)
            .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
            // Outside the limiter so 429s and unmatched routes are counted
            .layer(middleware::from_fn(track_metrics))
            .layer(body_limit(&config.security))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(cors_layer(&config.security))
                    .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                        handle_middleware_error(err, request_secs)
                    }))
                    .layer(TimeoutLayer::new(Duration::from_secs(request_secs))),
            )
    }

    /// The router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn explorer(&self) -> &ExplorerClient {
        &self.state.explorer
    }

    /// Run the server until a shutdown broadcast or OS signal.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            min_confirmations = self.state.verifier.min_confirmations(),
            network = %self.state.config.explorer.network,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Turn a request deadline into the standard error envelope.
fn handle_middleware_error(err: BoxError, request_secs: u64) -> Response {
    if err.is::<Elapsed>() {
        tracing::warn!(timeout_secs = request_secs, "Request deadline exceeded");
        ApiError::RequestTimeout(request_secs).into_response()
    } else {
        tracing::error!(error = %err, "Unhandled middleware error");
        ApiError::Internal(err.to_string()).into_response()
    }
}

/// Per-route request counter and latency histogram.
async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    // Raw paths of unmatched requests would explode label cardinality
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let method = request.method().clone();

    let response = next.run(request).await;
    metrics::record_request(method.as_str(), response.status().as_u16(), &route, start);
    response
}
