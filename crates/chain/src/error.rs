//! Chain-call error taxonomy (spec.md §4.1).

use thiserror::Error;

/// Errors a [`crate::ChainGateway`] call can resolve to.
#[derive(Debug, Error, Clone)]
pub enum ChainError {
    /// RPC timeout or transport failure. Retried by callers (bounded,
    /// default 3 attempts per spec.md §4.1) via `liq_utils::retry`.
    #[error("transient chain error: {0}")]
    Transient(String),

    /// The contract rejected the call; never retried.
    #[error("transaction reverted: {0}")]
    Revert(String),

    /// The transaction's nonce was replaced by another submission.
    #[error("transaction replaced: {0}")]
    Replaced(String)
}

impl ChainError {
    /// Used by [`liq_utils::retry::retry_transient`] to decide whether an
    /// attempt should be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
