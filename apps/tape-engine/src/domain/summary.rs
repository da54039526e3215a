//! Summary Aggregator
//!
//! Derives last price and percentage change from the current buffer
//! contents. The change is measured against the oldest retained event,
//! so it reflects change over the visible window, not lifetime change.
//!
//! The summary is a pure function of the buffer and is recomputed after
//! every accepted append, never cached independently.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::history::HistoryBuffer;

/// Derived statistics over the visible window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Price of the most recent trade. `None` iff the buffer is empty.
    pub last_price: Option<Decimal>,
    /// Percentage change from the oldest retained trade to the newest.
    pub change_pct: Decimal,
}

impl Summary {
    /// Summary of an empty window.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            last_price: None,
            change_pct: Decimal::ZERO,
        }
    }
}

impl Default for Summary {
    fn default() -> Self {
        Self::empty()
    }
}

/// Compute the summary for the buffer's current contents.
///
/// An oldest retained price of zero yields a change of zero rather than
/// dividing by it.
#[must_use]
pub fn summarize(buffer: &HistoryBuffer) -> Summary {
    let (Some(first), Some(last)) = (buffer.first(), buffer.last()) else {
        return Summary::empty();
    };

    let change_pct = if first.price.is_zero() {
        Decimal::ZERO
    } else {
        (last.price - first.price) / first.price * Decimal::ONE_HUNDRED
    };

    Summary {
        last_price: Some(last.price),
        change_pct,
    }
}

// =============================================================================
// Tests
// =============================================================================
