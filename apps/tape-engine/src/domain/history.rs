//! Bounded Trade History
//!
//! Maintains the sliding window of accepted trades: an ordered,
//! capacity-limited sequence in arrival order. Inserting into a full
//! buffer evicts from the front (FIFO), so the buffer always holds the
//! most recent `capacity` accepted events.
//!
//! Arrival order is not necessarily timestamp order; out-of-order
//! delivery is possible and consumers sort defensively if they need
//! chronological order.

use std::collections::VecDeque;

use crate::domain::trade::TradeEvent;

/// Default buffer capacity.
pub const DEFAULT_CAPACITY: usize = 200;

/// Capacity-bounded FIFO of canonical trade events.
///
/// Exclusively owned by one stream session; consumers only ever see
/// immutable snapshots taken via [`HistoryBuffer::snapshot`].
#[derive(Debug)]
pub struct HistoryBuffer {
    events: VecDeque<TradeEvent>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer. Capacity is clamped to a minimum of 1 so
    /// an append always retains the newest event.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an accepted event, evicting from the front when full.
    pub fn append(&mut self, event: TradeEvent) {
        while self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Empty the buffer. Used on session reset only.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Oldest retained event.
    #[must_use]
    pub fn first(&self) -> Option<&TradeEvent> {
        self.events.front()
    }

    /// Most recently appended event.
    #[must_use]
    pub fn last(&self) -> Option<&TradeEvent> {
        self.events.back()
    }

    /// Number of retained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the buffer holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Immutable snapshot of the retained events in arrival order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TradeEvent> {
        self.events.iter().cloned().collect()
    }
}

// =============================================================================
// Tests
// =============================================================================


#[cfg(test)]
mod properties {
    use super::*;
    use crate::domain::trade::Side;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn event(seq: usize) -> TradeEvent {
        TradeEvent::new(
            format!("t-{seq}"),
            seq as i64,
            Decimal::from(seq as u64),
            Decimal::ONE,
            Side::Sell,
        )
    }

    proptest! {
        #[test]
        fn length_never_exceeds_capacity(capacity in 1usize..64, count in 0usize..256) {
            let mut buffer = HistoryBuffer::new(capacity);
            for i in 0..count {
                buffer.append(event(i));
                prop_assert!(buffer.len() <= capacity);
            }
        }

        #[test]
        fn retains_most_recent_in_arrival_order(capacity in 1usize..32, count in 0usize..128) {
            let mut buffer = HistoryBuffer::new(capacity);
            for i in 0..count {
                buffer.append(event(i));
            }

            let expected_start = count.saturating_sub(capacity);
            let ids: Vec<_> = buffer.snapshot().into_iter().map(|e| e.id).collect();
            let expected: Vec<_> = (expected_start..count).map(|i| format!("t-{i}")).collect();
            prop_assert_eq!(ids, expected);
        }
    }
}
