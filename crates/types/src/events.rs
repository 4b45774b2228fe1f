//! The progress event stream fanned out to reporters (spec.md §4.6).

use alloy_primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

/// Coarse classification of an `Error` event, matching the taxonomy in
/// spec.md §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Fetch,
    Check,
    Liquidation,
    Internal,
    ReporterCrash
}

/// A single progress event emitted by some pipeline stage. Delivery to
/// reporters is best-effort (spec.md §4.6) — a slow subscriber never
/// blocks the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BotEvent {
    /// Emitted by the Position Tracker after a history or forward step.
    TradersFetched { count: usize, history_complete: bool, history_blocks_left: u64 },
    /// Emitted by the Liquidatability Checker, once per chunk (spec.md §8
    /// scenario 2: an empty subset is still a `TradersChecked` event).
    TradersChecked { liquidatable: Vec<Address> },
    /// Emitted by the Liquidator on a confirmed liquidation.
    TraderLiquidated { trader: Address, tx_hash: TxHash },
    /// A transient, non-fatal failure somewhere in the pipeline.
    Error { kind: ErrorKind, cause: String },
    /// Terminal event emitted once by the Coordinator after every stage has
    /// observed cancellation and exited.
    BotStopped
}
