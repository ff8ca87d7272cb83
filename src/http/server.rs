//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a catch-all handler
//! - Wire up middleware (tracing, timeouts, body limits)
//! - Buffer the inbound body and hand the request to the gateway
//! - Map gateway errors to HTTP responses
//! - Bind server to listener with graceful shutdown

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use http_body_util::LengthLimitError;
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::http::Request;

/// Per-connection context handed to every matcher, policy and origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientInfo {
    /// Peer address of the downstream connection.
    pub remote_addr: SocketAddr,
}

/// Application state injected into handlers.
#[derive(Clone)]
struct AppState {
    gateway: Arc<Gateway<ClientInfo>>,
    max_body_bytes: usize,
}

/// HTTP host serving a [`Gateway`].
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around `gateway`.
    pub fn new(config: &GatewayConfig, gateway: Arc<Gateway<ClientInfo>>) -> Self {
        let state = AppState {
            gateway,
            max_body_bytes: config.listener.max_body_bytes,
        };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Run the server until `shutdown` resolves, then drain open connections.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Buffers the request and runs it through the gateway.
async fn dispatch_handler(
    State(state): State<AppState>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    request: axum::http::Request<Body>,
) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) if exceeds_limit(&e) => {
            tracing::warn!(client = %remote_addr, limit = state.max_body_bytes, "Request body exceeded limit");
            return error_response(&GatewayError::PayloadTooLarge(state.max_body_bytes));
        }
        Err(e) => return error_response(&GatewayError::Body(e.to_string())),
    };

    let request = Request::from(axum::http::Request::from_parts(parts, body));
    let ctx = ClientInfo { remote_addr };

    match state.gateway.handle(&request, &ctx).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!(
                client = %remote_addr,
                method = %request.method(),
                path = %request.path(),
                error = %e,
                "Dispatch failed"
            );
            error_response(&e)
        }
    }
}

/// Whether a body read failed because the size limit was hit.
///
/// Bodies without a `Content-Length` pass the limit layer and trip the
/// limit while being buffered, wrapped somewhere in the error chain.
fn exceeds_limit(error: &axum::Error) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(err) = current {
        if err.is::<LengthLimitError>() {
            return true;
        }
        current = err.source();
    }
    false
}

/// Host-side mapping of dispatch errors to responses.
pub fn error_response(error: &GatewayError) -> Response {
    let (status, message) = match error {
        GatewayError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "upstream timed out"),
        GatewayError::Upstream(_) | GatewayError::InvalidTarget(_) => {
            (StatusCode::BAD_GATEWAY, "upstream request failed")
        }
        GatewayError::Body(_) => (StatusCode::BAD_REQUEST, "failed to read request body"),
        GatewayError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "request body too large"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal gateway error"),
    };
    (status, message).into_response()
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
