//! Runs the Liquidatability Checker on a fixed cadence against whatever
//! open-positions snapshot the Position Tracker currently exposes
//! (spec.md §4.3 "Scheduling").

use std::{sync::Arc, time::Duration};

use alloy_primitives::Address;
use liq_chain::ChainGateway;
use liq_types::{BotEvent, ErrorKind, InternalError};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{error, instrument};

use crate::checker::{scan, CheckOutcome};

/// Runs until `cancel` fires or a fatal [`InternalError`] is hit (a
/// gateway response-length mismatch, spec.md §7), in which case it
/// requests cancellation itself so the rest of the pipeline stops too.
///
/// `liquidatable` is an unbounded channel rather than a "latest wins"
/// slot: spec.md §8 scenario 5 requires every chunk's liquidatable subset
/// to reach the Liquidator, including chunks discovered before the
/// Liquidator has drained earlier ones, which a lossy slot cannot
/// guarantee. See `DESIGN.md` for the full rationale.
#[instrument(skip_all)]
pub async fn run_checker(
    gateway: Arc<dyn ChainGateway>,
    mut open_positions: watch::Receiver<Vec<Address>>,
    chunk_size: usize,
    recheck_interval: Duration,
    liquidatable: mpsc::UnboundedSender<Vec<Address>>,
    events: mpsc::Sender<BotEvent>,
    cancel: CancellationToken
) -> Result<(), InternalError> {
    loop {
        if cancel.is_cancelled() {
            return Ok(())
        }

        let snapshot = open_positions.borrow_and_update().clone();

        let result = scan(gateway.as_ref(), &snapshot, chunk_size, |outcome| match outcome {
            CheckOutcome::Liquidatable(subset) => {
                let _ = events.try_send(BotEvent::TradersChecked { liquidatable: subset.clone() });
                let _ = liquidatable.send(subset);
            }
            CheckOutcome::Error(err) => {
                let _ = events.try_send(BotEvent::Error { kind: ErrorKind::Check, cause: err.to_string() });
            }
        })
        .await;

        if let Err(err) = result {
            error!(%err, "liquidatability scan hit a fatal invariant violation, stopping the bot");
            let _ = events.send(BotEvent::Error { kind: ErrorKind::Internal, cause: err.to_string() }).await;
            cancel.cancel();
            return Err(err)
        }

        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            _ = tokio::time::sleep(recheck_interval) => {}
        }
    }
}
