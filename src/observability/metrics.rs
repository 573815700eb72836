//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (requests, latency, verification outcomes)
//! - Expose Prometheus-compatible metrics endpoint
//! - Track explorer call results and latency
//!
//! # Metrics
//! - `ergopay_requests_total` (counter): requests by method, route, status
//! - `ergopay_request_duration_seconds` (histogram): handler latency
//! - `ergopay_verifications_total` (counter): outcomes by code
//! - `ergopay_explorer_requests_total` (counter): explorer calls by result
//! - `ergopay_explorer_request_duration_seconds` (histogram): explorer latency
//! - `ergopay_explorer_health` (gauge): 1=reachable, 0=unreachable
//! - `ergopay_rate_limited_total` (counter): requests rejected by the limiter
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op, so tests and
//!   disabled metrics cost nothing

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed HTTP request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    counter!(
        "ergopay_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "ergopay_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of a verification attempt.
pub fn record_verification(outcome: &'static str) {
    counter!("ergopay_verifications_total", "outcome" => outcome).increment(1);
}

/// Record an explorer call.
pub fn record_explorer_request(result: &'static str, start: Instant) {
    counter!("ergopay_explorer_requests_total", "result" => result).increment(1);
    histogram!("ergopay_explorer_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

/// Record explorer reachability.
pub fn record_explorer_health(healthy: bool) {
    gauge!("ergopay_explorer_health").set(if healthy { 1.0 } else { 0.0 });
}

/// Record a request rejected by the rate limiter.
pub fn record_rate_limited() {
    counter!("ergopay_rate_limited_total").increment(1);
}
