//! Handle/receipt types returned by [`crate::ChainGateway::liquidate`] and
//! [`crate::ChainGateway::await_receipt`] (spec.md §4.1).

use alloy_primitives::TxHash;

/// A submitted-but-not-yet-confirmed liquidation transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxHandle {
    pub tx_hash: TxHash
}

/// The outcome of awaiting a [`TxHandle`] to be mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub status:  bool
}
