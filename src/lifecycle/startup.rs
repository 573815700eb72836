//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order (metrics, explorer, server)
//! - Query the explorer once and report reachability
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: a bad listener address or explorer URL is fatal
//! - An unreachable explorer is not: `/health` reports it as degraded

use thiserror::Error;
use tokio::net::TcpListener;

use crate::blockchain::ExplorerError;
use crate::config::GatewayConfig;
use crate::http::GatewayServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to initialize explorer client: {0}")]
    Explorer(#[from] ExplorerError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Start the gateway and run it until `shutdown` fires or a signal arrives.
pub async fn run(config: GatewayConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        // Address was checked by config validation
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.listener.bind_address.clone();
    let server = GatewayServer::new(config)?;

    if server.explorer().is_healthy().await {
        tracing::info!("Explorer reachable");
    } else {
        tracing::warn!("Explorer unreachable at startup, verification requests will fail until it recovers");
    }

    let listener = TcpListener::bind(&bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: bind_address.clone(),
            source,
        })?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut config = GatewayConfig::default();
        config.listener.bind_address = occupied.local_addr().unwrap().to_string();
        config.explorer.base_url = "http://127.0.0.1:9".to_string();
        config.explorer.timeout_secs = 1;
        config.explorer.use_system_proxy = false;

        let err = run(config, &Shutdown::new()).await.unwrap_err();
        assert!(matches!(err, StartupError::Bind { .. }));
    }

    #[tokio::test]
    async fn test_runs_until_shutdown() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "127.0.0.1:0".to_string();
        config.explorer.base_url = "http://127.0.0.1:9".to_string();
        config.explorer.timeout_secs = 1;
        config.explorer.use_system_proxy = false;

        let shutdown = std::sync::Arc::new(Shutdown::new());
        let trigger = shutdown.clone();
        let handle = tokio::spawn(async move { run(config, &shutdown).await });

        // Wait for the server to subscribe before triggering
        for _ in 0..50 {
            if trigger.receiver_count() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        trigger.trigger();

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }
}
