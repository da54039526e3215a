//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the WebSocket feed transport, the tolerant wire
//! normalizer, the replay feed, the stream session that drives the
//! domain state machine, and the operational surfaces (config, health,
//! metrics, telemetry).

/// Configuration loading and endpoint resolution.
pub mod config;

/// Feed transports and wire normalization.
pub mod feed;

/// Health check HTTP endpoint and snapshot surface.
pub mod health;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Stream session and snapshot fan-out.
pub mod stream;

/// Tracing initialization.
pub mod telemetry;
