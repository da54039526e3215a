//! Feed Transports
//!
//! Sources of trade stream notifications. Both the live WebSocket client
//! and the file replay drive the same [`FeedEvent`] channel, so the
//! session applies identical handling regardless of where the events
//! come from.

pub mod client;
pub mod normalize;
pub mod replay;

pub use client::FeedClient;
pub use normalize::{NormalizeError, TradeNormalizer};
pub use replay::ReplayFeed;

/// A notification from the feed transport.
///
/// Exactly one `Opened` is emitted per successful connection, followed by
/// any number of `Message`s, and finally `Closed` and/or
/// `TransportError`. Messages carry the raw payload; normalization
/// happens in the session so a corrupt frame never disturbs the
/// transport.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// Transport established.
    Opened,
    /// Raw inbound message payload.
    Message(String),
    /// Transport closed.
    Closed,
    /// Transport failed. Carries the underlying detail for logging; the
    /// observable error message is fixed.
    TransportError(String),
}
