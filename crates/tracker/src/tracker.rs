//! Position Tracker state machine (spec.md §3/§4.2). Pure logic only: no
//! I/O happens here, so the merge rule's invariants (commutativity,
//! idempotence, monotone frontiers) are directly testable without a mock
//! gateway.

use std::collections::{btree_map::Entry, BTreeMap};

use alloy_primitives::Address;
use liq_types::{PositionChange, PositionState};

/// Owns the open-positions map exclusively (spec.md §3 "Lifecycle"). Every
/// mutation goes through [`Self::apply_history_window`] or
/// [`Self::apply_forward_window`]; callers fetch the window to scan from
/// [`Self::next_history_window`]/[`Self::next_forward_window`] first,
/// perform the chain I/O themselves, then feed the result back in.
pub struct PositionTracker {
    genesis: u64,
    window: u64,
    history_frontier: u64,
    history_complete: bool,
    tip_seen: u64,
    positions: BTreeMap<Address, PositionState>
}

impl PositionTracker {
    /// Initial state (spec.md §4.2): `historyFrontier = currentTip`,
    /// `tipSeen = currentTip - 1`, empty map.
    pub fn new(genesis: u64, current_tip: u64, window: u64) -> Self {
        debug_assert!(window > 0, "a zero-width query window can never make progress");
        Self {
            genesis,
            window,
            history_frontier: current_tip,
            history_complete: current_tip < genesis,
            tip_seen: current_tip.saturating_sub(1),
            positions: BTreeMap::new()
        }
    }

    /// Current open set, ordered by address (spec.md §4.2 "stable ordering
    /// by address lowercase" — `Address`'s byte ordering is equivalent to
    /// lexicographic order on its lowercase hex rendering).
    pub fn open_positions(&self) -> Vec<Address> {
        self.positions.iter().filter(|(_, state)| state.open).map(|(addr, _)| *addr).collect()
    }

    pub fn history_complete(&self) -> bool {
        self.history_complete
    }

    /// `max(0, historyFrontier - genesis + 1)` (spec.md §4.2).
    pub fn history_blocks_left(&self) -> u64 {
        if self.history_complete {
            0
        } else {
            self.history_frontier.saturating_sub(self.genesis).saturating_add(1)
        }
    }

    pub fn tracked_traders(&self) -> usize {
        self.positions.len()
    }

    /// The next `[from, to]` history window to scan, or `None` once
    /// `historyComplete`.
    pub fn next_history_window(&self) -> Option<(u64, u64)> {
        if self.history_complete {
            return None
        }
        let to = self.history_frontier;
        let from = to.saturating_sub(self.window - 1).max(self.genesis);
        Some((from, to))
    }

    /// Folds `events` (from the `[from, to]` window named by
    /// [`Self::next_history_window`]) into the map and advances
    /// `historyFrontier` to `from - 1`, flipping `historyComplete` once the
    /// frontier would fall below `genesis` (spec.md §4.2).
    pub fn apply_history_window(&mut self, from: u64, events: &[PositionChange]) -> usize {
        let applied = self.merge_events(events);
        match from.checked_sub(1) {
            Some(new_frontier) if new_frontier >= self.genesis => self.history_frontier = new_frontier,
            _ => self.history_complete = true
        }
        applied
    }

    /// The next `[from, to]` forward window given the chain's current tip,
    /// or `None` if the tracker has already caught up to it.
    pub fn next_forward_window(&self, current_tip: u64) -> Option<(u64, u64)> {
        if current_tip <= self.tip_seen {
            return None
        }
        let from = self.tip_seen + 1;
        let to = current_tip.min(self.tip_seen + self.window);
        Some((from, to))
    }

    /// Folds `events` (from the `[tipSeen + 1, to]` window named by
    /// [`Self::next_forward_window`]) into the map and advances `tipSeen`.
    pub fn apply_forward_window(&mut self, to: u64, events: &[PositionChange]) -> usize {
        let applied = self.merge_events(events);
        self.tip_seen = to;
        applied
    }

    /// The merge rule from spec.md §4.2: events strictly older than a
    /// trader's recorded `lastSeen` are discarded. Order-independent within
    /// a batch, which is what makes backward and forward scans commute.
    fn merge_events(&mut self, events: &[PositionChange]) -> usize {
        let mut applied = 0;
        for change in events {
            match self.positions.entry(change.trader) {
                Entry::Vacant(slot) => {
                    slot.insert(PositionState::from_first_event(change));
                    applied += 1;
                }
                Entry::Occupied(mut slot) => {
                    if slot.get_mut().merge(change) {
                        applied += 1;
                    }
                }
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use liq_types::PositionKind;

    use super::*;

    fn change(trader: Address, block: u64, tx_index: u32, kind: PositionKind) -> PositionChange {
        PositionChange { trader, block, tx_index, kind }
    }

    #[test]
    fn opens_and_closes_flow_into_open_positions() {
        let mut tracker = PositionTracker::new(0, 100, 50);
        let trader = Address::with_last_byte(1);
        tracker.apply_forward_window(100, &[change(trader, 10, 0, PositionKind::Opened)]);
        assert_eq!(tracker.open_positions(), vec![trader]);

        tracker.apply_forward_window(101, &[change(trader, 11, 0, PositionKind::Closed)]);
        assert!(tracker.open_positions().is_empty());
    }

    #[test]
    fn history_frontier_decreases_monotonically_and_completes_at_genesis() {
        let mut tracker = PositionTracker::new(0, 120, 50);
        assert_eq!(tracker.next_history_window(), Some((71, 120)));
        tracker.apply_history_window(71, &[]);
        assert!(!tracker.history_complete());

        assert_eq!(tracker.next_history_window(), Some((21, 70)));
        tracker.apply_history_window(21, &[]);
        assert!(!tracker.history_complete());

        assert_eq!(tracker.next_history_window(), Some((0, 20)));
        tracker.apply_history_window(0, &[]);
        assert!(tracker.history_complete());
        assert_eq!(tracker.history_blocks_left(), 0);
        assert_eq!(tracker.next_history_window(), None);
    }

    #[test]
    fn history_blocks_left_counts_down() {
        let tracker = PositionTracker::new(0, 120, 50);
        assert_eq!(tracker.history_blocks_left(), 121);
    }

    #[test]
    fn forward_window_is_none_once_caught_up() {
        let tracker = PositionTracker::new(0, 100, 50);
        assert_eq!(tracker.next_forward_window(99), None);
        assert_eq!(tracker.next_forward_window(100), None);
        assert_eq!(tracker.next_forward_window(105), Some((100, 100)));
    }

    #[test]
    fn stale_event_from_an_overlapping_window_is_discarded() {
        let mut tracker = PositionTracker::new(0, 100, 50);
        let trader = Address::with_last_byte(7);
        tracker.apply_forward_window(100, &[change(trader, 50, 0, PositionKind::Opened)]);
        tracker.apply_forward_window(101, &[change(trader, 51, 0, PositionKind::Closed)]);
        // A re-delivered, older event from an overlapping window must not
        // resurrect the position.
        tracker.apply_forward_window(102, &[change(trader, 50, 0, PositionKind::Opened)]);
        assert!(tracker.open_positions().is_empty());
    }

    #[test]
    fn window_order_commutes() {
        let trader = Address::with_last_byte(9);
        let r1 = vec![change(trader, 10, 0, PositionKind::Opened)];
        let r2 = vec![change(trader, 20, 0, PositionKind::Closed)];

        let mut forward_then_back = PositionTracker::new(0, 100, 50);
        forward_then_back.apply_forward_window(100, &r1);
        forward_then_back.apply_forward_window(101, &r2);

        let mut back_then_forward = PositionTracker::new(0, 100, 50);
        back_then_forward.apply_forward_window(100, &r2);
        back_then_forward.apply_forward_window(101, &r1);

        assert_eq!(forward_then_back.open_positions(), back_then_forward.open_positions());
    }

    #[test]
    fn reapplying_the_same_window_is_idempotent() {
        let trader = Address::with_last_byte(3);
        let events = vec![change(trader, 10, 0, PositionKind::Opened)];

        let mut tracker = PositionTracker::new(0, 100, 50);
        tracker.apply_forward_window(100, &events);
        let first = tracker.open_positions();
        tracker.apply_forward_window(100, &events);
        let second = tracker.open_positions();

        assert_eq!(first, second);
    }
}
