//! Canonical Trade Event
//!
//! The normalized internal representation of one trade tick, independent
//! of upstream wire naming. Upstream feeds deliver trades under several
//! field conventions (verbose `ts`/`price`/`qty` or compact `T`/`p`/`q`);
//! the normalizer collapses all of them into this type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Side
// =============================================================================

/// Trade side from the taker's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buyer was the aggressor.
    Buy,
    /// Seller was the aggressor.
    Sell,
}

impl Side {
    /// Get the wire name for this side.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

// =============================================================================
// Trade Event
// =============================================================================

/// A canonical trade tick.
///
/// Every field is validated before construction: the normalizer rejects
/// messages whose timestamp, price, or quantity fail to coerce to a
/// number, so an event of this type is always complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeEvent {
    /// Unique identifier within the session buffer. Synthesized when the
    /// source omits one.
    pub id: String,
    /// Trade time, milliseconds since epoch.
    pub ts: i64,
    /// Execution price.
    pub price: Decimal,
    /// Traded quantity.
    pub qty: Decimal,
    /// Taker side.
    pub side: Side,
}

impl TradeEvent {
    /// Create a new trade event.
    #[must_use]
    pub const fn new(id: String, ts: i64, price: Decimal, qty: Decimal, side: Side) -> Self {
        Self {
            id,
            ts,
            price,
            qty,
            side,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
