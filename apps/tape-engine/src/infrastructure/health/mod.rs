//! Health Check and Snapshot Endpoint
//!
//! HTTP surface for health checks, the outbound stream snapshot, and
//! Prometheus metrics. Used by container orchestrators, monitoring
//! systems, and the presentation layer.
//!
//! # Endpoints
//!
//! - `GET /health` - JSON health status mapped from the feed lifecycle
//! - `GET /healthz` - liveness probe (simple OK)
//! - `GET /readyz` - readiness probe (200 iff the feed is open)
//! - `GET /snapshot` - the full outbound stream snapshot
//! - `GET /metrics` - Prometheus metrics in text format

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::domain::lifecycle::ConnectionStatus;
use crate::infrastructure::metrics::get_metrics_handle;
use crate::infrastructure::stream::StreamSnapshot;

// =============================================================================
// Health Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy", "degraded", or "unhealthy".
    pub status: HealthStatus,
    /// Engine version.
    pub version: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Current time.
    pub current_time: DateTime<Utc>,
    /// Feed connection status.
    pub feed: FeedInfo,
}

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Feed open, trades flowing.
    Healthy,
    /// Feed still connecting.
    Degraded,
    /// Feed closed or failed.
    Unhealthy,
}

/// Feed status details.
#[derive(Debug, Clone, Serialize)]
pub struct FeedInfo {
    /// Connection status.
    pub status: ConnectionStatus,
    /// Last error message, if any.
    pub error: Option<String>,
    /// Trades currently retained in the history buffer.
    pub buffered_trades: usize,
}

// =============================================================================
// Health Server State
// =============================================================================

/// Shared state for the health server.
pub struct HealthServerState {
    version: String,
    started_at: Instant,
    snapshots: watch::Receiver<StreamSnapshot>,
}

impl HealthServerState {
    /// Create new health server state around a snapshot subscription.
    #[must_use]
    pub fn new(version: String, snapshots: watch::Receiver<StreamSnapshot>) -> Self {
        Self {
            version,
            started_at: Instant::now(),
            snapshots,
        }
    }
}

// =============================================================================
// Health Server
// =============================================================================

/// Health check HTTP server.
pub struct HealthServer {
    port: u16,
    state: Arc<HealthServerState>,
    cancel: CancellationToken,
}

impl HealthServer {
    /// Create a new health server.
    #[must_use]
    pub const fn new(port: u16, state: Arc<HealthServerState>, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Run the health server until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `HealthServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), HealthServerError> {
        let app = Router::new()
            .route("/health", get(health_handler))
            .route("/healthz", get(liveness_handler))
            .route("/readyz", get(readiness_handler))
            .route("/snapshot", get(snapshot_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(self.state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| HealthServerError::BindFailed(self.port, e.to_string()))?;

        tracing::info!(port = self.port, "Health server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| HealthServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Health server stopped");
        Ok(())
    }
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn health_handler(State(state): State<Arc<HealthServerState>>) -> impl IntoResponse {
    let response = build_health_response(&state);
    let status_code = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(response))
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness_handler(State(state): State<Arc<HealthServerState>>) -> impl IntoResponse {
    let status = state.snapshots.borrow().status;
    if status == ConnectionStatus::Open {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

async fn snapshot_handler(State(state): State<Arc<HealthServerState>>) -> impl IntoResponse {
    let snapshot = state.snapshots.borrow().clone();
    Json(snapshot)
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            let body = handle.render();
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                body,
            )
        },
    )
}

fn build_health_response(state: &HealthServerState) -> HealthResponse {
    let snapshot = state.snapshots.borrow().clone();

    HealthResponse {
        status: health_of(snapshot.status),
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        current_time: Utc::now(),
        feed: FeedInfo {
            status: snapshot.status,
            error: snapshot.error,
            buffered_trades: snapshot.trades.len(),
        },
    }
}

const fn health_of(status: ConnectionStatus) -> HealthStatus {
    match status {
        ConnectionStatus::Open => HealthStatus::Healthy,
        ConnectionStatus::Connecting => HealthStatus::Degraded,
        ConnectionStatus::Closed | ConnectionStatus::Error => HealthStatus::Unhealthy,
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Health server errors.
#[derive(Debug, thiserror::Error)]
pub enum HealthServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Tests
// =============================================================================
