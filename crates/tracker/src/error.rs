//! Position Tracker error taxonomy (spec.md §7).

use thiserror::Error;

/// Failure to retrieve or apply a window of position events. Transient:
/// the caller leaves state untouched and retries on the next tick.
#[derive(Debug, Error)]
#[error("failed to fetch position events: {cause}")]
pub struct FetchError {
    pub cause: String
}

impl From<liq_chain::ChainError> for FetchError {
    fn from(err: liq_chain::ChainError) -> Self {
        Self { cause: err.to_string() }
    }
}
