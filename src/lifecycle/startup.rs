//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the storage adapter named by config
//! - Compose the route groups into an [`App`](crate::app::App)
//! - Start the metrics exporter when enabled
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last (traffic only when every group has completed)

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::api::compose;
use crate::app::ComposeError;
use crate::config::{DatabaseBackend, DatabaseConfig, ServiceConfig};
use crate::data::memory::MemoryDataAccess;
use crate::data::mysql::MySqlDataAccess;
use crate::data::{DataAccess, DataAccessError};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Fatal startup failure.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database unavailable: {0}")]
    Database(#[from] DataAccessError),

    #[error("route composition failed: {0}")]
    Compose(#[from] ComposeError),

    #[error("invalid metrics address `{0}`")]
    MetricsAddress(String),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Open the configured storage adapter.
///
/// The MySQL pool is lazy: a database that is down at startup does not stop
/// the service, requests that need it fail instead.
pub fn connect_data(config: &DatabaseConfig) -> Result<Arc<dyn DataAccess>, StartupError> {
    match config.backend {
        DatabaseBackend::Mysql => Ok(Arc::new(MySqlDataAccess::connect_lazy(config)?)),
        DatabaseBackend::Memory => {
            tracing::warn!("Using in-memory data access; writes are not persisted");
            Ok(Arc::new(MemoryDataAccess::new()))
        }
    }
}

/// Start every subsystem and serve until `shutdown` fires.
pub async fn run(config: ServiceConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    let data = connect_data(&config.database)?;

    let app = compose(data, &config).await?;
    for route in app.routes() {
        tracing::info!(route = %route.label(), group = %route.group(), "Route registered");
    }

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| {
                StartupError::MetricsAddress(config.observability.metrics_address.clone())
            })?;
        metrics::init_metrics(addr);
    }

    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    HttpServer::new(config, app)
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DispatchRequest;
    use axum::http::StatusCode;

    fn unreachable_mysql() -> DatabaseConfig {
        DatabaseConfig {
            backend: DatabaseBackend::Mysql,
            url: "mysql://root@127.0.0.1:1/bookstore".into(),
            acquire_timeout_secs: 1,
            ..DatabaseConfig::default()
        }
    }

    #[tokio::test]
    async fn test_unreachable_database_does_not_block_startup() {
        let started = std::time::Instant::now();
        assert!(connect_data(&unreachable_mysql()).is_ok());
        assert!(started.elapsed() < std::time::Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_unreachable_database_fails_per_request() {
        let data = connect_data(&unreachable_mysql()).unwrap();
        let app = compose(data, &ServiceConfig::default()).await.unwrap();

        let reply = app.dispatch(DispatchRequest::get("/")).await.unwrap();
        assert_eq!(reply.status(), StatusCode::OK);

        let err = app.dispatch(DispatchRequest::get("/books/")).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_malformed_database_url_is_fatal() {
        let config = DatabaseConfig {
            url: "not a url".into(),
            ..unreachable_mysql()
        };
        assert!(matches!(connect_data(&config), Err(StartupError::Database(_))));
    }
}
