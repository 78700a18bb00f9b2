//! HTTP server for the metrics and timing endpoints.

use crate::aggregate::TimingReport;
use crate::ledger::Ledger;
use crate::metrics::GameMetrics;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;

/// Errors that can occur during metrics server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(String),
}

/// Configuration for the metrics server.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], 9090).into(),
        }
    }
}

impl MetricsServerConfig {
    /// Creates a config with a custom port.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], port).into(),
        }
    }
}

/// Shared state for the handlers.
pub struct MetricsState {
    metrics: Arc<GameMetrics>,
    ledger: Arc<dyn Ledger>,
}

/// Serves `/metrics`, `/health` and `/timings`.
pub struct MetricsServer {
    config: MetricsServerConfig,
    state: Arc<MetricsState>,
}

impl MetricsServer {
    pub fn new(
        config: MetricsServerConfig,
        metrics: Arc<GameMetrics>,
        ledger: Arc<dyn Ledger>,
    ) -> Self {
        Self {
            config,
            state: Arc::new(MetricsState { metrics, ledger }),
        }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .route("/timings", get(timings_handler))
            .layer(CorsLayer::permissive())
            .with_state(Arc::clone(&self.state))
    }

    /// Starts the HTTP server and runs until it is shut down.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        tracing::info!(addr = %self.config.bind_addr, "Metrics server listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Handler for the /metrics endpoint.
async fn metrics_handler(State(state): State<Arc<MetricsState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {}", e),
        ),
    }
}

/// Handler for the /health endpoint.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Handler for the /timings endpoint: both ledger series as JSON.
async fn timings_handler(State(state): State<Arc<MetricsState>>) -> Response {
    let ledger = Arc::clone(&state.ledger);
    // Reading the ledger is blocking file I/O.
    let result =
        tokio::task::spawn_blocking(move || TimingReport::from_ledger(ledger.as_ref())).await;

    match result {
        Ok(Ok(report)) => Json(report).into_response(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Failed to aggregate ledger");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to read ledger: {}", e))
                .into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
