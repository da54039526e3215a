//! Live Feed WebSocket Client
//!
//! Owns the single streaming connection for a session: connects,
//! forwards raw text frames into the session channel, answers pings,
//! and reports close and error as [`FeedEvent`]s.
//!
//! There is no automatic reconnect. Once the transport closes or fails,
//! the connection instance is dead; re-establishing a feed requires a
//! fresh session.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use super::FeedEvent;

/// WebSocket client for the live trade feed.
pub struct FeedClient {
    url: String,
    events: mpsc::Sender<FeedEvent>,
    cancel: CancellationToken,
}

impl FeedClient {
    /// Create a new feed client.
    #[must_use]
    pub const fn new(url: String, events: mpsc::Sender<FeedEvent>, cancel: CancellationToken) -> Self {
        Self {
            url,
            events,
            cancel,
        }
    }

    /// Run the connection until it closes, fails, or is cancelled.
    ///
    /// Transport failures surface as a `TransportError` event followed by
    /// `Closed`, mirroring a real socket where the close lands right
    /// after the error. Cancellation tears the connection down without
    /// emitting either.
    pub async fn run(self) {
        if let Err(e) = self.connect_and_read().await {
            tracing::warn!(url = %self.url, error = %e, "Feed transport error");
            let _ = self.events.send(FeedEvent::TransportError(e.to_string())).await;
            let _ = self.events.send(FeedEvent::Closed).await;
        }
    }

    async fn connect_and_read(&self) -> Result<(), tokio_tungstenite::tungstenite::Error> {
        tracing::info!(url = %self.url, "Connecting to trade feed");

        let (ws_stream, _response) = tokio_tungstenite::connect_async(&self.url).await?;
        let (mut write, mut read) = ws_stream.split();

        let _ = self.events.send(FeedEvent::Opened).await;

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    tracing::info!("Feed client cancelled");
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let _ = self.events.send(FeedEvent::Message(text.to_string())).await;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("Feed sent close frame");
                            let _ = self.events.send(FeedEvent::Closed).await;
                            return Ok(());
                        }
                        Some(Ok(_)) => {
                            // Binary and pong frames carry no trades.
                        }
                        Some(Err(e)) => {
                            return Err(e);
                        }
                        None => {
                            tracing::info!("Feed stream ended");
                            let _ = self.events.send(FeedEvent::Closed).await;
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
