//! End-to-End Feed Tests
//!
//! Runs the real transports against a local WebSocket server and a
//! temporary capture file, with the full session pipeline behind them.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Write;
use std::net::SocketAddr;
use std::time::Duration;

use futures_util::SinkExt;
use rust_decimal_macros::dec;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use tape_engine::{
    ConnectionStatus, FeedClient, FeedEvent, ReplayFeed, STREAM_ERROR_MESSAGE, SessionHandle,
    StreamSnapshot, start_session,
};

/// Serve one WebSocket connection, send the given frames, then close.
async fn spawn_feed_server(frames: Vec<Message>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        for frame in frames {
            ws.send(frame).await.unwrap();
        }
        let _ = ws.close(None).await;
    });

    addr
}

fn start_pipeline(capacity: usize) -> (mpsc::Sender<FeedEvent>, SessionHandle, CancellationToken) {
    let (tx, rx) = mpsc::channel(64);
    let cancel = CancellationToken::new();
    let handle = start_session(capacity, rx, cancel.clone());
    (tx, handle, cancel)
}

async fn await_snapshot<F>(rx: &mut watch::Receiver<StreamSnapshot>, pred: F) -> StreamSnapshot
where
    F: Fn(&StreamSnapshot) -> bool,
{
    timeout(Duration::from_secs(5), async {
        loop {
            {
                let current = rx.borrow();
                if pred(&current) {
                    return current.clone();
                }
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("timed out waiting for snapshot")
}

#[tokio::test]
async fn live_feed_mixing_valid_malformed_and_ping_frames() {
    let addr = spawn_feed_server(vec![
        Message::Text(r#"{"ts":1700000000001,"price":100,"qty":1,"side":"buy"}"#.into()),
        Message::Ping(vec![1, 2, 3].into()),
        Message::Text("{definitely not json".into()),
        Message::Text(r#"{"T":1700000000002,"p":150,"q":2,"m":true}"#.into()),
    ])
    .await;

    let (tx, handle, cancel) = start_pipeline(200);
    let client = FeedClient::new(format!("ws://{addr}"), tx, cancel.clone());
    tokio::spawn(client.run());

    let mut rx = handle.subscribe();
    let snapshot = await_snapshot(&mut rx, |s| {
        s.status == ConnectionStatus::Closed && s.trades.len() == 2
    })
    .await;

    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.summary.last_price, Some(dec!(150)));
    assert_eq!(snapshot.summary.change_pct, dec!(50));

    handle.shutdown().await;
}

#[tokio::test]
async fn refused_connection_surfaces_the_fixed_error() {
    // Bind then drop to get a port nothing is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (tx, handle, cancel) = start_pipeline(200);
    let client = FeedClient::new(format!("ws://{addr}"), tx, cancel.clone());
    tokio::spawn(client.run());

    let mut rx = handle.subscribe();
    let snapshot = await_snapshot(&mut rx, |s| s.status == ConnectionStatus::Error).await;

    assert_eq!(snapshot.error.as_deref(), Some(STREAM_ERROR_MESSAGE));
    assert!(snapshot.trades.is_empty());

    // The close that follows the failed connect must not clear the error.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.status, ConnectionStatus::Error);
    assert_eq!(snapshot.error.as_deref(), Some(STREAM_ERROR_MESSAGE));

    handle.shutdown().await;
}

#[tokio::test]
async fn replay_drives_the_same_session_path() {
    // Capture files stringify every field, like the upstream replay tool.
    let mut capture = tempfile::NamedTempFile::new().unwrap();
    writeln!(capture, r#"{{"ts": "1700000000001", "price": "100.0", "qty": "0.5", "side": "buy"}}"#)
        .unwrap();
    writeln!(capture).unwrap();
    writeln!(capture, r#"{{"ts": "1700000000002", "price": "120.0", "qty": "0.25", "side": "sell"}}"#)
        .unwrap();
    writeln!(capture, r#"{{"ts": "1700000000003", "price": "150.0", "qty": "1", "side": "buy"}}"#)
        .unwrap();
    capture.flush().unwrap();

    let (tx, handle, cancel) = start_pipeline(200);
    let feed = ReplayFeed::new(
        capture.path().to_path_buf(),
        Duration::from_millis(1),
        tx,
        cancel.clone(),
    );
    tokio::spawn(feed.run());

    let mut rx = handle.subscribe();
    let snapshot = await_snapshot(&mut rx, |s| {
        s.status == ConnectionStatus::Closed && s.trades.len() == 3
    })
    .await;

    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.summary.last_price, Some(dec!(150.0)));
    assert_eq!(snapshot.summary.change_pct, dec!(50));

    handle.shutdown().await;
}

#[tokio::test]
async fn missing_replay_file_surfaces_the_fixed_error() {
    let (tx, handle, cancel) = start_pipeline(200);
    let feed = ReplayFeed::new(
        std::path::PathBuf::from("/nonexistent/capture.ndjson"),
        Duration::from_millis(1),
        tx,
        cancel.clone(),
    );
    tokio::spawn(feed.run());

    let mut rx = handle.subscribe();
    let snapshot = await_snapshot(&mut rx, |s| s.status == ConnectionStatus::Error).await;
    assert_eq!(snapshot.error.as_deref(), Some(STREAM_ERROR_MESSAGE));

    handle.shutdown().await;
}
