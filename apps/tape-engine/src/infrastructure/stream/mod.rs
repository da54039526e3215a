//! Stream Session
//!
//! One session owns one connection instance end to end: it applies feed
//! notifications to the lifecycle state machine and the history buffer,
//! recomputes the summary after every accepted trade, and publishes
//! immutable [`StreamSnapshot`]s over a watch channel.
//!
//! Notifications are applied sequentially by a single task, so the
//! buffer needs no locking. Teardown cancels the transport and marks
//! the session dead; a notification racing teardown is discarded rather
//! than mutating discarded state.

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::domain::history::HistoryBuffer;
use crate::domain::lifecycle::{ConnectionStatus, LifecycleState};
use crate::domain::summary::{Summary, summarize};
use crate::domain::trade::TradeEvent;
use crate::infrastructure::feed::{FeedEvent, TradeNormalizer};
use crate::infrastructure::metrics;

// =============================================================================
// Snapshot
// =============================================================================

/// Immutable view of the session state, published on every change.
///
/// This is the engine's entire outbound surface; the presentation layer
/// and the HTTP snapshot endpoint both consume it as-is.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSnapshot {
    /// Retained trades in arrival order.
    pub trades: Vec<TradeEvent>,
    /// Most recent accepted trade.
    pub latest_trade: Option<TradeEvent>,
    /// Connection status.
    pub status: ConnectionStatus,
    /// Last error message, if any.
    pub error: Option<String>,
    /// Derived statistics over the visible window.
    pub summary: Summary,
}

impl StreamSnapshot {
    /// Snapshot of a freshly started session.
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            trades: Vec::new(),
            latest_trade: None,
            status: ConnectionStatus::Connecting,
            error: None,
            summary: Summary::empty(),
        }
    }
}

// =============================================================================
// Session Handle
// =============================================================================

/// Handle to a running stream session.
///
/// Dropping the handle does not stop the session; call
/// [`SessionHandle::stop`] or [`SessionHandle::shutdown`].
pub struct SessionHandle {
    snapshots: watch::Receiver<StreamSnapshot>,
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl SessionHandle {
    /// Subscribe to snapshot updates. Each receiver observes the latest
    /// snapshot; dropping the receiver unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StreamSnapshot> {
        self.snapshots.clone()
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> StreamSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Whether the session is still applying notifications.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.cancel.is_cancelled() && !self.task.is_finished()
    }

    /// Tear the session down. Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Tear the session down and wait for the task to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

// =============================================================================
// Session
// =============================================================================

/// Session state driven by the feed event channel.
struct StreamSession {
    normalizer: TradeNormalizer,
    lifecycle: LifecycleState,
    buffer: HistoryBuffer,
    snapshots: watch::Sender<StreamSnapshot>,
    cancel: CancellationToken,
}

impl StreamSession {
    fn start(
        capacity: usize,
        mut events: mpsc::Receiver<FeedEvent>,
        cancel: CancellationToken,
    ) -> SessionHandle {
        let (snapshot_tx, snapshot_rx) = watch::channel(StreamSnapshot::initial());

        let mut session = Self {
            normalizer: TradeNormalizer::new(),
            lifecycle: LifecycleState::new(),
            buffer: HistoryBuffer::new(capacity),
            snapshots: snapshot_tx,
            cancel: cancel.clone(),
        };

        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = task_cancel.cancelled() => {
                        tracing::info!("Stream session torn down");
                        return;
                    }
                    event = events.recv() => {
                        match event {
                            Some(event) => session.apply(event),
                            None => {
                                tracing::debug!("Feed event channel closed");
                                return;
                            }
                        }
                    }
                }
            }
        });

        SessionHandle {
            snapshots: snapshot_rx,
            cancel,
            task,
        }
    }

    /// Apply one feed notification.
    fn apply(&mut self, event: FeedEvent) {
        // Guard against a notification racing teardown.
        if self.cancel.is_cancelled() {
            tracing::debug!("Discarding feed event after teardown");
            return;
        }

        match event {
            FeedEvent::Opened => {
                if self.lifecycle.open() {
                    tracing::info!("Trade feed open");
                    metrics::record_lifecycle_transition(ConnectionStatus::Open);
                    self.publish();
                }
            }
            FeedEvent::Message(text) => self.apply_message(&text),
            FeedEvent::Closed => {
                if self.lifecycle.close() {
                    tracing::info!("Trade feed closed");
                    metrics::record_lifecycle_transition(ConnectionStatus::Closed);
                    self.publish();
                }
            }
            FeedEvent::TransportError(detail) => {
                if self.lifecycle.fail() {
                    tracing::warn!(detail = %detail, "Trade feed error");
                    metrics::record_lifecycle_transition(ConnectionStatus::Error);
                    self.publish();
                }
            }
        }
    }

    fn apply_message(&mut self, text: &str) {
        match self.normalizer.decode(text) {
            Ok(trade) => {
                self.buffer.append(trade);
                metrics::record_trade_accepted();
                metrics::set_buffer_len(self.buffer.len());
                self.publish();
            }
            Err(e) => {
                // One corrupt tick must never interrupt the stream.
                tracing::debug!(error = %e, "Dropping unusable trade message");
                metrics::record_message_rejected(e.reason());
            }
        }
    }

    /// Publish the current state as an immutable snapshot.
    fn publish(&self) {
        let trades = self.buffer.snapshot();
        let snapshot = StreamSnapshot {
            latest_trade: trades.last().cloned(),
            summary: summarize(&self.buffer),
            status: self.lifecycle.status(),
            error: self.lifecycle.error().map(str::to_string),
            trades,
        };
        let _ = self.snapshots.send(snapshot);
    }
}

/// Spawn a session task consuming `events` with the given buffer
/// capacity. Cancelling the token tears the session down.
#[must_use]
pub fn start_session(
    capacity: usize,
    events: mpsc::Receiver<FeedEvent>,
    cancel: CancellationToken,
) -> SessionHandle {
    StreamSession::start(capacity, events, cancel)
}

// =============================================================================
// Tests
// =============================================================================
