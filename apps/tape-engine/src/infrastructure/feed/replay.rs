//! Capture File Replay
//!
//! Drives the session's [`FeedEvent`] channel from a newline-delimited
//! JSON capture file at a fixed inter-event delay, simulating real-time
//! ingestion. Replay emits the same open/message/close notifications as
//! the live client, so the session path is exercised identically.

use std::path::PathBuf;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;
use tokio_util::sync::CancellationToken;

use super::FeedEvent;
use tokio::sync::mpsc;

/// Replay feed source.
pub struct ReplayFeed {
    file: PathBuf,
    delay: Duration,
    events: mpsc::Sender<FeedEvent>,
    cancel: CancellationToken,
}

impl ReplayFeed {
    /// Create a new replay feed.
    #[must_use]
    pub const fn new(
        file: PathBuf,
        delay: Duration,
        events: mpsc::Sender<FeedEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            file,
            delay,
            events,
            cancel,
        }
    }

    /// Replay the capture file until exhausted or cancelled.
    ///
    /// A file that cannot be opened surfaces as a transport error plus a
    /// close, exactly like a failed live connection.
    pub async fn run(self) {
        let file = match File::open(&self.file).await {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(file = %self.file.display(), error = %e, "Replay file open failed");
                let _ = self.events.send(FeedEvent::TransportError(e.to_string())).await;
                let _ = self.events.send(FeedEvent::Closed).await;
                return;
            }
        };

        tracing::info!(
            file = %self.file.display(),
            delay_ms = self.delay.as_millis(),
            "Replaying trade capture"
        );

        let _ = self.events.send(FeedEvent::Opened).await;

        let mut lines = LinesStream::new(BufReader::new(file).lines());
        let mut replayed = 0_u64;

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    tracing::info!(replayed, "Replay cancelled");
                    return;
                }
                line = lines.next() => {
                    match line {
                        Some(Ok(line)) => {
                            if line.trim().is_empty() {
                                continue;
                            }
                            let _ = self.events.send(FeedEvent::Message(line)).await;
                            replayed += 1;
                            tokio::time::sleep(self.delay).await;
                        }
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Replay read error");
                            let _ = self.events.send(FeedEvent::TransportError(e.to_string())).await;
                            let _ = self.events.send(FeedEvent::Closed).await;
                            return;
                        }
                        None => {
                            tracing::info!(replayed, "Replay complete");
                            let _ = self.events.send(FeedEvent::Closed).await;
                            return;
                        }
                    }
                }
            }
        }
    }
}
