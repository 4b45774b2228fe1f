//! Liquidator error taxonomy (spec.md §7).

use thiserror::Error;

/// Failure to submit or confirm a liquidation for `trader`. Non-fatal: the
/// trader is re-qualified and, if still liquidatable, retried after
/// `retryInterval` (spec.md §4.4).
#[derive(Debug, Error, Clone)]
#[error("liquidation of {trader} failed: {cause}")]
pub struct LiquidationError {
    pub trader: alloy_primitives::Address,
    pub cause:  String
}
