#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::default_trait_access
    )
)]

//! Tape Engine - Live Trade Feed Core
//!
//! Ingests a live market-trade WebSocket feed, normalizes heterogeneous
//! message shapes into canonical events, keeps a bounded rolling
//! history, derives summary statistics, and exposes session state to
//! consumers as immutable snapshots.
//!
//! # Layers (inside -> outside)
//!
//! - **Domain**: Pure state with no I/O
//!   - `trade`: Canonical trade event
//!   - `history`: Bounded FIFO sliding window
//!   - `lifecycle`: Connection status state machine
//!   - `summary`: Derived stats over the visible window
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `feed`: WebSocket client, capture replay, wire normalizer
//!   - `stream`: Session task and snapshot fan-out
//!   - `config`: Environment configuration and endpoint resolution
//!   - `health`: Health check HTTP endpoint and snapshot surface
//!   - `metrics`: Prometheus instrumentation
//!   - `telemetry`: Tracing initialization
//!
//! # Data Flow
//!
//! ```text
//! Feed WS / Replay --> FeedEvent channel --> Stream Session --> watch snapshots
//!                                              |    (normalize, append,
//!                                              |     summarize)
//!                                              +--> /health /snapshot /metrics
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core trade stream types with no I/O.
pub mod domain;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::history::{DEFAULT_CAPACITY, HistoryBuffer};
pub use domain::lifecycle::{ConnectionStatus, LifecycleState, STREAM_ERROR_MESSAGE};
pub use domain::summary::{Summary, summarize};
pub use domain::trade::{Side, TradeEvent};

// Feed transports and normalization
pub use infrastructure::feed::{
    FeedClient, FeedEvent, NormalizeError, ReplayFeed, TradeNormalizer,
};

// Stream session
pub use infrastructure::stream::{SessionHandle, StreamSnapshot, start_session};

// Configuration
pub use infrastructure::config::{
    ConfigError, DEFAULT_ENDPOINT, EngineConfig, OriginContext, ReplaySettings, load_dotenv,
    resolve_endpoint,
};

// Health server
pub use infrastructure::health::{HealthServer, HealthServerError, HealthServerState};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::init as init_telemetry;
