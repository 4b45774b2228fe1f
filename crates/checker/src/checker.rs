//! Liquidatability Checker algorithm (spec.md §4.3): partitions a snapshot
//! into fixed-size chunks and checks each in turn, tolerating per-chunk
//! failures without aborting the whole scan.

use std::cmp::min;

use alloy_primitives::Address;
use liq_chain::{ChainError, ChainGateway};
use liq_types::InternalError;
use liq_utils::retry::{retry_transient, DEFAULT_ATTEMPTS};

use crate::error::{CheckError, FilterError};

/// One partial result from a scan. Consumers MUST tolerate interleaved
/// `Liquidatable` and `Error` outcomes within a single scan (spec.md §4.3).
#[derive(Debug, Clone)]
pub enum CheckOutcome {
    Liquidatable(Vec<Address>),
    Error(CheckError)
}

/// Scans `open` in chunks of `chunk_size`, invoking `on_outcome` for every
/// partial result as it completes. Returns `Err` only for the fatal case —
/// a gateway response whose length doesn't match the request — which stops
/// the scan early; any other per-chunk failure is folded into a
/// [`CheckOutcome::Error`] and the scan continues.
pub async fn scan(gateway: &dyn ChainGateway, open: &[Address], chunk_size: usize, mut on_outcome: impl FnMut(CheckOutcome)) -> Result<(), InternalError> {
    debug_assert!(chunk_size > 0, "a zero chunk size can never make progress");
    let total = open.len();
    let chunk_size = chunk_size.max(1);

    for chunk_start in (0..total).step_by(chunk_size) {
        let chunk_end = min(chunk_start + chunk_size, total);
        let chunk = &open[chunk_start..chunk_end];

        match filter_liquidatable(gateway, chunk).await {
            Ok(subset) => on_outcome(CheckOutcome::Liquidatable(subset)),
            Err(FilterError::Transient(cause)) => on_outcome(CheckOutcome::Error(CheckError { chunk_start, chunk_end, total, cause })),
            Err(FilterError::LengthMismatch(err)) => return Err(err)
        }
    }

    Ok(())
}

/// Calls the gateway's `isLiquidatable` (itself retried up to 3 times on
/// transient failures, spec.md §4.1) and filters `batch` down to the
/// liquidatable subset, preserving input order. Shared by the scan loop
/// above and by the Liquidator's re-qualification step (spec.md §4.4), so
/// neither duplicates the other's chunking/retry logic.
pub async fn filter_liquidatable(gateway: &dyn ChainGateway, batch: &[Address]) -> Result<Vec<Address>, FilterError> {
    if batch.is_empty() {
        return Ok(Vec::new())
    }

    let result = retry_transient(DEFAULT_ATTEMPTS, || gateway.is_liquidatable(batch), ChainError::is_transient)
        .await
        .map_err(|err| FilterError::Transient(err.to_string()))?;

    if result.len() != batch.len() {
        return Err(FilterError::LengthMismatch(InternalError::LiquidatableResultLengthMismatch {
            expected: batch.len(),
            got: result.len()
        }))
    }

    Ok(batch.iter().copied().zip(result).filter_map(|(addr, liquidatable)| liquidatable.then_some(addr)).collect())
}

#[cfg(test)]
mod tests {
    use liq_chain::mock::MockChainGateway;

    use super::*;

    #[tokio::test]
    async fn splits_a_snapshot_into_chunks_preserving_order() {
        let gateway = MockChainGateway::new();
        let open: Vec<Address> = (0..5).map(Address::with_last_byte).collect();
        gateway.push_liquidatable(vec![false, true]);
        gateway.push_liquidatable(vec![false, true]);
        gateway.push_liquidatable(vec![true]);

        let mut outcomes = Vec::new();
        scan(&gateway, &open, 2, |outcome| outcomes.push(outcome)).await.unwrap();

        assert_eq!(outcomes.len(), 3);
        let calls = gateway.check_calls();
        assert_eq!(calls[0], open[0..2].to_vec());
        assert_eq!(calls[1], open[2..4].to_vec());
        assert_eq!(calls[2], open[4..5].to_vec());
    }

    #[tokio::test]
    async fn a_chunk_error_does_not_abort_the_scan() {
        let gateway = MockChainGateway::new();
        let open: Vec<Address> = (0..4).map(Address::with_last_byte).collect();
        gateway.push_check_error(ChainError::Transient("rpc timeout".to_string()));
        gateway.push_liquidatable(vec![true, false]);

        let mut outcomes = Vec::new();
        scan(&gateway, &open, 2, |outcome| outcomes.push(outcome)).await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], CheckOutcome::Error(_)));
        assert!(matches!(outcomes[1], CheckOutcome::Liquidatable(_)));
    }

    #[tokio::test]
    async fn a_length_mismatch_is_fatal_and_stops_the_scan() {
        let gateway = MockChainGateway::new();
        let open: Vec<Address> = (0..4).map(Address::with_last_byte).collect();
        gateway.push_liquidatable(vec![true]); // wrong length for a chunk of 2

        let mut outcomes = Vec::new();
        let result = scan(&gateway, &open, 2, |outcome| outcomes.push(outcome)).await;

        assert!(result.is_err());
        assert!(outcomes.is_empty());
    }
}
