//! Chain Gateway (spec.md §4.1): the single point where the two supported
//! exchange-contract schema variants ("v4", "v4.1") are hidden from the
//! rest of the pipeline. Everything downstream is polymorphic over
//! [`liq_types::PositionChange`] only (spec.md §9).

pub mod error;
pub mod gateway;
pub mod signer;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

use alloy_primitives::Address;
use async_trait::async_trait;
pub use error::ChainError;
use liq_types::PositionChange;
pub use types::{Receipt, TxHandle};

pub use crate::gateway::AlloyChainGateway;

/// Abstracts the chain for the rest of the pipeline (spec.md §4.1).
///
/// Every method is a suspension point (spec.md §5); implementations carry
/// an implementation-defined timeout on each call so callers never block
/// unboundedly.
#[async_trait]
pub trait ChainGateway: Send + Sync + 'static {
    /// The current chain tip.
    async fn current_block(&self) -> Result<u64, ChainError>;

    /// Position-changed events in the inclusive range `[from, to]`, ordered
    /// by `(block, tx_index)` ascending (spec.md §4.1).
    async fn fetch_position_events(&self, from: u64, to: u64) -> Result<Vec<PositionChange>, ChainError>;

    /// Read-only liquidatability check for a batch of traders. The result
    /// length always equals `batch.len()`; a mismatch is an
    /// [`liq_types::InternalError`], not a [`ChainError`], and is the
    /// caller's responsibility to detect.
    async fn is_liquidatable(&self, batch: &[Address]) -> Result<Vec<bool>, ChainError>;

    /// Submits a liquidation transaction for `trader`, returning a handle
    /// immediately (spec.md §4.1).
    async fn liquidate(&self, trader: Address) -> Result<TxHandle, ChainError>;

    /// Awaits a submitted liquidation transaction's receipt.
    async fn await_receipt(&self, handle: TxHandle) -> Result<Receipt, ChainError>;
}
