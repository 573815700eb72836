//! Ergo explorer REST client with timeout and failover.
//!
//! # Responsibilities
//! - Resolve a transaction id to its outputs and confirmation count
//! - Query explorer height for health checks
//! - Map transport and HTTP failures to distinguishable errors
//! - Fail over across configured explorer instances

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::time::timeout;
use url::Url;

use crate::blockchain::types::{
    ExplorerConfig, ExplorerError, ExplorerResult, ExplorerTransaction, NetworkState,
};
use crate::observability::metrics;
use crate::payments::Transaction;

/// Explorer client wrapper with failover support.
#[derive(Clone)]
pub struct ExplorerClient {
    /// Shared HTTP connection pool.
    http: reqwest::Client,
    /// Base URLs (primary + failovers), each ending in '/'.
    endpoints: Vec<Url>,
    /// Configuration.
    config: ExplorerConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl ExplorerClient {
    /// Create a new explorer client.
    ///
    /// No request is made; an unreachable explorer surfaces on first use.
    pub fn new(config: ExplorerConfig) -> ExplorerResult<Self> {
        let timeout_duration = Duration::from_secs(config.timeout_secs);
        let mut endpoints = Vec::new();

        endpoints.push(parse_endpoint(&config.base_url)?);
        for url_str in &config.failover_urls {
            match parse_endpoint(url_str) {
                Ok(url) => endpoints.push(url),
                Err(e) => tracing::warn!(url = %url_str, error = %e, "Ignoring invalid failover explorer URL"),
            }
        }

        let mut builder = reqwest::Client::builder()
            .timeout(timeout_duration)
            .user_agent(concat!("ergopay-gateway/", env!("CARGO_PKG_VERSION")));
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| ExplorerError::Connection(format!("Failed to build HTTP client: {e}")))?;

        tracing::info!(
            base_url = %config.base_url,
            failovers = endpoints.len() - 1,
            network = %config.network,
            "Explorer client initialized"
        );

        Ok(Self {
            http,
            endpoints,
            config,
            timeout_duration,
        })
    }

    /// Fetch a transaction by id.
    pub async fn get_transaction(&self, tx_id: &str) -> ExplorerResult<Transaction> {
        let path = format!("api/v1/transactions/{tx_id}");
        match self.get_json::<ExplorerTransaction>(&path).await {
            Ok(tx) => Ok(tx.into()),
            Err(ExplorerError::NotFound(_)) => {
                Err(ExplorerError::NotFound(format!("Transaction {tx_id}")))
            }
            Err(e) => Err(e),
        }
    }

    /// Get the explorer's current chain height.
    pub async fn get_height(&self) -> ExplorerResult<u64> {
        let state: NetworkState = self.get_json("api/v1/networkState").await?;
        Ok(state.height)
    }

    /// Check if the explorer is reachable and healthy.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.get_height().await.is_ok();
        metrics::record_explorer_health(healthy);
        healthy
    }

    /// Get the configuration.
    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Try each endpoint in turn until one answers authoritatively.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ExplorerResult<T> {
        let mut last_error =
            ExplorerError::Unavailable("No explorer endpoints configured".to_string());

        for (i, base) in self.endpoints.iter().enumerate() {
            let url = base
                .join(path)
                .map_err(|e| ExplorerError::InvalidEndpoint(format!("{base}{path}: {e}")))?;

            let start = Instant::now();
            let result = match timeout(self.timeout_duration, self.fetch::<T>(url)).await {
                Ok(result) => result,
                Err(_) => Err(ExplorerError::Timeout(self.config.timeout_secs)),
            };
            metrics::record_explorer_request(
                result.as_ref().map_or_else(ExplorerError::code, |_| "ok"),
                start,
            );

            match result {
                Ok(value) => return Ok(value),
                Err(e) if !e.should_failover() => return Err(e),
                Err(e) => {
                    tracing::warn!(endpoint_idx = i, error = %e, "Explorer request failed, trying next endpoint");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> ExplorerResult<T> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ExplorerError::NotFound(url.path().to_string())),
            StatusCode::TOO_MANY_REQUESTS => Err(ExplorerError::RateLimited),
            status if !status.is_success() => Err(ExplorerError::Unavailable(format!(
                "Explorer returned {status}"
            ))),
            _ => response.json::<T>().await.map_err(|e| {
                if e.is_timeout() {
                    ExplorerError::Timeout(self.config.timeout_secs)
                } else {
                    ExplorerError::Unavailable(format!("Malformed explorer response: {e}"))
                }
            }),
        }
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ExplorerError {
        if e.is_timeout() {
            ExplorerError::Timeout(self.config.timeout_secs)
        } else if e.is_connect() {
            ExplorerError::Connection(e.to_string())
        } else {
            ExplorerError::Unavailable(e.to_string())
        }
    }
}

impl std::fmt::Debug for ExplorerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerClient")
            .field("base_url", &self.config.base_url)
            .field("endpoints", &self.endpoints.len())
            .field("timeout_secs", &self.config.timeout_secs)
            .finish()
    }
}

/// Parse a base URL so that `Url::join` appends rather than replaces the last
/// path segment.
fn parse_endpoint(raw: &str) -> ExplorerResult<Url> {
    let mut url: Url = raw
        .parse()
        .map_err(|e| ExplorerError::InvalidEndpoint(format!("'{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ExplorerError::InvalidEndpoint(format!(
            "'{raw}': unsupported scheme"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
