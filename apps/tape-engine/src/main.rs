//! Tape Engine Binary
//!
//! Starts the live trade feed engine.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin tape-engine
//! ```
//!
//! # Environment Variables
//!
//! All optional:
//! - `TRADES_WS`: Feed WebSocket endpoint (overrides origin derivation)
//! - `TAPE_ORIGIN`: Hosting origin, e.g. `https://dash.example.com`
//! - `TAPE_BUFFER_CAPACITY`: History buffer capacity (default: 200)
//! - `TAPE_HEALTH_PORT`: Health check HTTP port (default: 8090)
//! - `TAPE_REPLAY_FILE`: Replay a capture file instead of connecting
//! - `TAPE_REPLAY_DELAY_MS`: Delay between replayed events (default: 50)
//! - `RUST_LOG`: Log level (default: info)

use anyhow::Context;
use tape_engine::infrastructure::telemetry;
use tape_engine::{
    EngineConfig, FeedClient, FeedEvent, HealthServer, HealthServerState, ReplayFeed, SessionHandle,
    init_metrics, load_dotenv, start_session,
};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Feed event channel depth.
const FEED_CHANNEL_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    load_dotenv();
    telemetry::init();

    tracing::info!("Starting tape engine");

    let _metrics_handle = init_metrics();

    let config = EngineConfig::from_env().context("loading configuration")?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    // Feed transport task: live WebSocket or capture replay, both driving
    // the same event channel.
    let (feed_tx, feed_rx) = mpsc::channel::<FeedEvent>(FEED_CHANNEL_CAPACITY);

    if let Some(replay) = config.replay.clone() {
        let feed = ReplayFeed::new(replay.file, replay.delay, feed_tx, shutdown_token.clone());
        tokio::spawn(feed.run());
    } else {
        let url = config.feed_url(None);
        let client = FeedClient::new(url, feed_tx, shutdown_token.clone());
        tokio::spawn(client.run());
    }

    // Session task: applies feed events, publishes snapshots.
    let session = start_session(config.buffer_capacity, feed_rx, shutdown_token.clone());

    // Health server over the session's snapshot subscription.
    let health_state = std::sync::Arc::new(HealthServerState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        session.subscribe(),
    ));
    let health_server = HealthServer::new(config.health_port, health_state, shutdown_token.clone());
    tokio::spawn(async move {
        if let Err(e) = health_server.run().await {
            tracing::error!(error = %e, "Health server error");
        }
    });

    tracing::info!("Tape engine ready");

    await_shutdown(shutdown_token).await;
    drain_session(session).await;

    tracing::info!("Tape engine stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &EngineConfig) {
    tracing::info!(
        buffer_capacity = config.buffer_capacity,
        health_port = config.health_port,
        replay = config.replay.is_some(),
        "Configuration loaded"
    );
    tracing::debug!(feed_url = %config.feed_url(None), "Feed endpoint resolved");
}

/// Wait for shutdown signal (SIGTERM or SIGINT), then cancel the token.
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}

/// Wait for the session task to observe the cancellation.
async fn drain_session(session: SessionHandle) {
    session.shutdown().await;
}
