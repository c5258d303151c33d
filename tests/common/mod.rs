//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::net::TcpListener;

use bookshelf::api::compose;
use bookshelf::config::{DatabaseBackend, ServiceConfig};
use bookshelf::data::memory::MemoryDataAccess;
use bookshelf::data::Row;
use bookshelf::http::HttpServer;
use bookshelf::lifecycle::Shutdown;
use bookshelf::App;

/// Defaults with the in-memory backend and a loopback listener.
#[allow(dead_code)]
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.database.backend = DatabaseBackend::Memory;
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config
}

/// The service's route groups composed over `data`.
#[allow(dead_code)]
pub async fn service_app(data: &Arc<MemoryDataAccess>) -> App {
    compose(data.clone(), &test_config())
        .await
        .expect("service routes compose")
}

/// Convert a JSON object literal into a row.
#[allow(dead_code)]
pub fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("row must be an object, got {other}"),
    }
}

/// Serve `app` on an ephemeral loopback port until `Shutdown` fires.
#[allow(dead_code)]
pub async fn start_server(app: App) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(test_config(), app);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// A client that never pools or proxies.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
