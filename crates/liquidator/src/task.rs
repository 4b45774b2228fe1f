//! Liquidator task (spec.md §4.4): submits liquidation transactions for
//! every trader the Checker found eligible, retrying against a fresh
//! liquidatability check rather than blindly.

use std::{sync::Arc, time::Duration};

use alloy_primitives::{Address, TxHash};
use liq_chain::ChainGateway;
use liq_checker::{filter_liquidatable, FilterError};
use liq_types::{BotEvent, ErrorKind, InternalError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::{error::LiquidationError, pending::Pending};

/// Runs until `cancel` fires, the upstream channel closes, or a fatal
/// [`InternalError`] surfaces from the re-qualification path.
#[instrument(skip_all)]
pub async fn run_liquidator(
    gateway: Arc<dyn ChainGateway>,
    mut liquidatable: mpsc::UnboundedReceiver<Vec<Address>>,
    liquidation_delay: Duration,
    retry_interval: Duration,
    events: mpsc::Sender<BotEvent>,
    cancel: CancellationToken
) -> Result<(), InternalError> {
    let mut pending = Pending::new();

    loop {
        if cancel.is_cancelled() {
            return Ok(())
        }

        if pending.is_empty() {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                received = liquidatable.recv() => match received {
                    Some(batch) => pending.enqueue(batch),
                    None => { info!("checker channel closed, liquidator stopping"); return Ok(()) }
                }
            }
        } else {
            while let Ok(batch) = liquidatable.try_recv() {
                pending.enqueue(batch);
            }
        }

        if !liquidation_delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(liquidation_delay) => {}
            }
        }

        let batch: Vec<Address> = pending.iter_in_order().collect();
        let mut errored = Vec::new();

        for trader in batch {
            if cancel.is_cancelled() {
                return Ok(())
            }

            match attempt_liquidation(gateway.as_ref(), trader).await {
                Ok(tx_hash) => {
                    pending.remove(&trader);
                    let _ = events.send(BotEvent::TraderLiquidated { trader, tx_hash }).await;
                }
                Err(err) => {
                    warn!(%err, "liquidation attempt failed");
                    errored.push(trader);
                    let _ = events.send(BotEvent::Error { kind: ErrorKind::Liquidation, cause: err.to_string() }).await;
                }
            }
        }

        if errored.is_empty() {
            continue
        }

        match filter_liquidatable(gateway.as_ref(), &errored).await {
            Ok(still_liquidatable) => {
                let still_liquidatable: std::collections::HashSet<_> = still_liquidatable.into_iter().collect();
                for trader in &errored {
                    if !still_liquidatable.contains(trader) {
                        pending.remove(trader);
                    }
                }
            }
            Err(FilterError::Transient(cause)) => {
                // Leave `errored` addresses in `pending`; they are
                // re-qualified again next round instead of being retried
                // blind.
                warn!(cause, "re-qualification check failed, deferring retry to next round");
            }
            Err(FilterError::LengthMismatch(err)) => {
                let _ = events.send(BotEvent::Error { kind: ErrorKind::Internal, cause: err.to_string() }).await;
                cancel.cancel();
                return Err(err)
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            _ = tokio::time::sleep(retry_interval) => {}
        }
    }
}

/// Submits and awaits one liquidation (spec.md §4.4 step 3). A
/// transaction rejected outright (`ChainError::Revert`) and one that
/// mines but whose receipt reports failure are both surfaced as a
/// [`LiquidationError`]; only a mined, successful receipt counts.
async fn attempt_liquidation(gateway: &dyn ChainGateway, trader: Address) -> Result<TxHash, LiquidationError> {
    let handle = gateway
        .liquidate(trader)
        .await
        .map_err(|err| LiquidationError { trader, cause: err.to_string() })?;

    let receipt = gateway
        .await_receipt(handle)
        .await
        .map_err(|err| LiquidationError { trader, cause: err.to_string() })?;

    if receipt.status {
        Ok(receipt.tx_hash)
    } else {
        Err(LiquidationError { trader, cause: "transaction mined but reverted".to_string() })
    }
}
