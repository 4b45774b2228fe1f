//! The trader/position model from spec.md §3.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// What a [`PositionChange`] represents, derived from the raw chain log by
/// the gateway (spec.md §4.1/§6): `Opened` when both legs of the pre-trade
/// size were zero, `Closed` when both legs of the post-trade size are zero,
/// `Modified` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionKind {
    Opened,
    Closed,
    Modified
}

/// A single position-changed event, ordered by `(block, tx_index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionChange {
    pub trader:   Address,
    pub block:    u64,
    pub tx_index: u32,
    pub kind:     PositionKind
}

impl PositionChange {
    /// The `(block, tx_index)` ordering key used throughout §3/§4.2.
    pub fn order_key(&self) -> (u64, u32) {
        (self.block, self.tx_index)
    }
}

/// Per-trader bookkeeping owned exclusively by the Position Tracker
/// (spec.md §3 "Lifecycle"). `last_seen` is the `(block, tx_index)` of the
/// most recent event folded into this state; `open` reflects that event's
/// kind per the merge rule in spec.md §4.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionState {
    pub last_seen: (u64, u32),
    pub open:      bool
}

impl PositionState {
    /// Builds the initial state for a trader's first observed event.
    pub fn from_first_event(change: &PositionChange) -> Self {
        Self { last_seen: change.order_key(), open: change.kind != PositionKind::Closed }
    }

    /// Applies the merge rule from spec.md §4.2: events strictly older than
    /// `last_seen` are discarded; otherwise `last_seen` advances and `open`
    /// is updated per the event kind (a `Modified` event never flips
    /// `open`, it just advances the watermark).
    ///
    /// Returns `true` if the event was applied.
    pub fn merge(&mut self, change: &PositionChange) -> bool {
        let key = change.order_key();
        if key < self.last_seen {
            return false
        }

        self.last_seen = key;
        match change.kind {
            PositionKind::Opened => self.open = true,
            PositionKind::Closed => self.open = false,
            PositionKind::Modified => {}
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(block: u64, tx_index: u32, kind: PositionKind) -> PositionChange {
        PositionChange { trader: Address::ZERO, block, tx_index, kind }
    }

    #[test]
    fn opened_then_closed_is_not_open() {
        let mut state = PositionState::from_first_event(&change(10, 0, PositionKind::Opened));
        assert!(state.open);
        assert!(state.merge(&change(11, 0, PositionKind::Closed)));
        assert!(!state.open);
    }

    #[test]
    fn stale_event_is_discarded() {
        let mut state = PositionState::from_first_event(&change(10, 0, PositionKind::Opened));
        state.merge(&change(20, 0, PositionKind::Closed));
        assert!(!state.merge(&change(15, 0, PositionKind::Opened)));
        assert!(!state.open, "the later Closed event must win");
    }

    #[test]
    fn modified_never_flips_open() {
        let mut state = PositionState::from_first_event(&change(10, 0, PositionKind::Opened));
        state.merge(&change(11, 2, PositionKind::Modified));
        assert!(state.open);
        assert_eq!(state.last_seen, (11, 2));
    }

    #[test]
    fn merge_is_idempotent() {
        let mut a = PositionState::from_first_event(&change(10, 0, PositionKind::Opened));
        let mut b = a;
        let e = change(12, 3, PositionKind::Modified);
        a.merge(&e);
        a.merge(&e);
        b.merge(&e);
        assert_eq!(a, b);
    }
}
