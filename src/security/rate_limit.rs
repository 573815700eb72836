//! Per-client rate limiting middleware.
//!
//! Buckets idle for longer than a full refill are indistinguishable from new
//! ones, so they are swept every `SWEEP_EVERY` checks.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::http::response::ApiError;
use crate::observability::metrics;

/// A simple token bucket rate limiter.
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Number of checks between idle-bucket sweeps.
pub const SWEEP_EVERY: u64 = 1024;

/// Shared limiter state, one bucket per client key.
pub struct RateLimiter {
    buckets: DashMap<String, TokenBucket>,
    enabled: bool,
    rps: f64,
    burst: f64,
    /// Time for an empty bucket to refill completely.
    idle_ttl: Duration,
    checks: AtomicU64,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let rps = f64::from(config.requests_per_second);
        let burst = f64::from(config.burst_size);
        let idle_ttl = if rps > 0.0 {
            Duration::from_secs_f64(burst / rps)
        } else {
            Duration::MAX
        };
        Self {
            buckets: DashMap::new(),
            enabled: config.enabled,
            rps,
            burst,
            idle_ttl,
            checks: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Take a token for `key`. Always succeeds when disabled.
    pub fn check(&self, key: &str) -> bool {
        if !self.enabled {
            return true;
        }
        let allowed = {
            let mut bucket = self
                .buckets
                .entry(key.to_string())
                .or_insert_with(|| TokenBucket::new(self.burst));
            bucket.try_acquire(self.burst, self.rps)
        };

        // The entry guard above must be released before sweeping
        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            let evicted = self.evict_idle(self.idle_ttl);
            if evicted > 0 {
                tracing::debug!(evicted, remaining = self.buckets.len(), "Evicted idle rate limit buckets");
            }
        }
        allowed
    }

    /// Drop buckets untouched for at least `idle`. Returns how many were removed.
    pub fn evict_idle(&self, idle: Duration) -> usize {
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| bucket.last_update.elapsed() < idle);
        before.saturating_sub(self.buckets.len())
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }
}

/// Middleware function for per-IP rate limiting.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.is_enabled() {
        return next.run(request).await;
    }

    // ConnectInfo is absent when the router is driven without a socket (tests)
    let key = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if limiter.check(&key) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, "Rate limit exceeded");
        metrics::record_rate_limited();
        ApiError::RateLimited.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(rps: u32, burst: u32) -> RateLimitConfig {
        RateLimitConfig {
            enabled: true,
            requests_per_second: rps,
            burst_size: burst,
        }
    }

    #[test]
    fn test_burst_then_reject() {
        let limiter = RateLimiter::new(&config(1, 3));
        assert!(limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.1"));
        assert!(!limiter.check("10.0.0.1"));
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = RateLimiter::new(&config(1, 1));
        assert!(limiter.check("10.0.0.1"));
        assert!(!limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.2"));
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn test_refill() {
        let mut bucket = TokenBucket::new(1.0);
        assert!(bucket.try_acquire(1.0, 1000.0));
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(bucket.try_acquire(1.0, 1000.0));
    }

    #[test]
    fn test_disabled_never_limits() {
        let mut cfg = config(1, 1);
        cfg.enabled = false;
        let limiter = RateLimiter::new(&cfg);
        for _ in 0..10 {
            assert!(limiter.check("10.0.0.1"));
        }
        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[test]
    fn test_idle_bucket_is_evicted() {
        let limiter = RateLimiter::new(&config(1, 1));
        assert!(limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.2"));
        std::thread::sleep(std::time::Duration::from_millis(30));
        limiter.check("10.0.0.2");

        assert_eq!(limiter.evict_idle(Duration::from_millis(20)), 1);
        assert_eq!(limiter.tracked_clients(), 1);
        assert!(!limiter.check("10.0.0.2"));
    }

    #[test]
    fn test_sweep_runs_during_checks() {
        // 1000 rps with a burst of 1 refills in 1ms
        let limiter = RateLimiter::new(&config(1000, 1));
        limiter.check("10.0.0.1");
        std::thread::sleep(std::time::Duration::from_millis(10));

        for _ in 0..SWEEP_EVERY {
            limiter.check("10.0.0.2");
        }
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
