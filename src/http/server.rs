//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router whose fallback forwards every request to the [`App`]
//! - Wire up middleware (timeout, request ID, tracing)
//! - Bind server to listener, stop on the shutdown broadcast

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app::App;
use crate::config::ServiceConfig;
use crate::http::request::{into_dispatch_request, request_id, UuidRequestId, X_REQUEST_ID};
use crate::http::response::reply_response;

/// State injected into the dispatch handler.
#[derive(Clone)]
struct ServerState {
    app: App,
    body_limit: usize,
}

/// HTTP front of the service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server serving `app`.
    pub fn new(config: ServiceConfig, app: App) -> Self {
        let state = ServerState {
            app,
            body_limit: config.security.max_body_size,
        };
        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: ServerState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = request_id(request.headers()).unwrap_or("-"),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), UuidRequestId))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal is broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Decode, dispatch, encode.
async fn dispatch_handler(State(state): State<ServerState>, request: Request<Body>) -> Response {
    let request = match into_dispatch_request(request, state.body_limit).await {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!(error = %err, "Request rejected before dispatch");
            return err.into_response();
        }
    };

    match state.app.dispatch(request).await {
        Ok(reply) => reply_response(reply),
        Err(err) => err.into_response(),
    }
}
