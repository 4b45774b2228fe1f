//! Liquidatability Checker error taxonomy (spec.md §7).

use liq_types::InternalError;
use thiserror::Error;

/// A single chunk failed to evaluate. Transient: the scan continues with
/// the next chunk, and the addresses in `[chunk_start, chunk_end)` make no
/// progress this round (spec.md §4.3/§7).
#[derive(Debug, Error, Clone)]
#[error("liquidatability check failed for traders [{chunk_start}, {chunk_end}) of {total}: {cause}")]
pub struct CheckError {
    pub chunk_start: usize,
    pub chunk_end: usize,
    pub total: usize,
    pub cause: String
}

/// Outcome of a single gateway `isLiquidatable` call, before it is folded
/// into a [`CheckError`] (transient) or propagated as fatal
/// ([`InternalError`], a response-length mismatch).
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("{0}")]
    Transient(String),
    #[error(transparent)]
    LengthMismatch(#[from] InternalError)
}
