//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ergopay_gateway::{GatewayConfig, GatewayServer, Shutdown};
use ergopay_sdk::GatewayClient;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const MERCHANT: &str = "9fRAWhdxEsTcdb8PhGNrZfwqa65zfkuYHAMmkQLcic1gdLSV5vA";
pub const OTHER: &str = "9gNvAv97W71Wm33GoXgSQBFJxinFubKvE6wh2dEhFTSgYEe783j";
pub const TX_ID: &str = "e5a4a4b2c5f1f1d3a0e6b9c8d7f6e5a4b3c2d1e0f9a8b7c6d5e4f3a2b1c0d9e8";

/// A mock explorer on an ephemeral port.
pub struct MockExplorer {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl MockExplorer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Start a programmable mock explorer. `f` receives the request path and
/// returns the status and JSON body.
pub async fn start_mock_explorer<F, Fut>(f: F) -> MockExplorer
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let f = Arc::new(f);

    let counter = hits.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let counter = counter.clone();
                    tokio::spawn(async move {
                        let Some(path) = read_request_path(&mut socket).await else {
                            return;
                        };
                        counter.fetch_add(1, Ordering::SeqCst);
                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockExplorer { addr, hits }
}

/// Read a request head and return its path. Explorer calls are bodiless GETs.
async fn read_request_path(socket: &mut tokio::net::TcpStream) -> Option<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let head = String::from_utf8_lossy(&buf);
    head.lines()
        .next()?
        .split_whitespace()
        .nth(1)
        .map(str::to_string)
}

/// Explorer transaction body.
pub fn tx_body(id: &str, confirmations: u32, outputs: &[(&str, u64)]) -> String {
    let outputs: Vec<_> = outputs
        .iter()
        .map(|(address, value)| json!({ "address": address, "value": value }))
        .collect();
    json!({ "id": id, "numConfirmations": confirmations, "outputs": outputs }).to_string()
}

/// Explorer that serves one transaction and a fixed height.
pub async fn explorer_with_tx(confirmations: u32, outputs: &'static [(&'static str, u64)]) -> MockExplorer {
    start_mock_explorer(move |path| async move {
        if path == format!("/api/v1/transactions/{TX_ID}") {
            (200, tx_body(TX_ID, confirmations, outputs))
        } else if path == "/api/v1/networkState" {
            (200, json!({ "height": 1_234_567 }).to_string())
        } else {
            (404, json!({ "status": 404, "reason": "not found" }).to_string())
        }
    })
    .await
}

/// Gateway configuration pointing at the given explorers.
pub fn gateway_config(explorer_urls: &[String]) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.explorer.base_url = explorer_urls[0].clone();
    config.explorer.failover_urls = explorer_urls[1..].to_vec();
    config.explorer.timeout_secs = 1;
    config.explorer.use_system_proxy = false;
    config.verification.min_confirmations = 2;
    config
}

/// A gateway serving on an ephemeral port, stopped on drop.
pub struct TestGateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// SDK client that bypasses any system proxy.
    pub fn client(&self) -> GatewayClient {
        let http = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();
        GatewayClient::with_client(http, &self.url())
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn spawn_gateway(config: GatewayConfig) -> TestGateway {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = GatewayServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestGateway { addr, shutdown }
}

/// An address with nothing listening on it.
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
