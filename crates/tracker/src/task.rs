//! Spawns the Position Tracker's two scheduled steps (spec.md §4.2
//! "Scheduling") as one cooperative task, and fans out progress events plus
//! a "latest wins" snapshot of the open set.

use std::{sync::Arc, time::Duration};

use liq_chain::ChainGateway;
use liq_types::{BotEvent, ErrorKind};
use liq_utils::retry::{retry_transient, DEFAULT_ATTEMPTS};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::{error::FetchError, tracker::PositionTracker};

/// Runs the Position Tracker until `cancel` fires. `open_positions` is a
/// `watch` slot: Fetcher→Checker is a "latest wins" handoff (spec.md §4.5),
/// so a snapshot the Checker hasn't consumed yet is simply overwritten.
#[instrument(skip_all)]
pub async fn run_tracker(
    gateway: Arc<dyn ChainGateway>,
    genesis_block: u64,
    max_blocks_per_query: u64,
    refetch_interval: Duration,
    open_positions: watch::Sender<Vec<alloy_primitives::Address>>,
    events: mpsc::Sender<BotEvent>,
    cancel: CancellationToken
) {
    let current_tip = match retry_transient(DEFAULT_ATTEMPTS, || gateway.current_block(), liq_chain::ChainError::is_transient).await {
        Ok(tip) => tip,
        Err(err) => {
            let _ = events.send(BotEvent::Error { kind: ErrorKind::Fetch, cause: FetchError::from(err).to_string() }).await;
            return
        }
    };

    let mut tracker = PositionTracker::new(genesis_block, current_tip, max_blocks_per_query);
    let mut forward_ticker = tokio::time::interval(refetch_interval);
    forward_ticker.tick().await;

    loop {
        if cancel.is_cancelled() {
            break
        }

        if !tracker.history_complete() {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = step_history(&mut tracker, gateway.as_ref(), &events) => {}
                _ = forward_ticker.tick() => step_forward(&mut tracker, gateway.as_ref(), &events).await,
            }
        } else {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = forward_ticker.tick() => step_forward(&mut tracker, gateway.as_ref(), &events).await,
            }
        }

        let _ = open_positions.send(tracker.open_positions());
        let _ = events
            .send(BotEvent::TradersFetched {
                count: tracker.tracked_traders(),
                history_complete: tracker.history_complete(),
                history_blocks_left: tracker.history_blocks_left()
            })
            .await;
    }

    info!("position tracker stopped");
}

async fn step_history(tracker: &mut PositionTracker, gateway: &dyn ChainGateway, events: &mpsc::Sender<BotEvent>) {
    let Some((from, to)) = tracker.next_history_window() else { return };

    match retry_transient(DEFAULT_ATTEMPTS, || gateway.fetch_position_events(from, to), liq_chain::ChainError::is_transient).await {
        Ok(window_events) => {
            tracker.apply_history_window(from, &window_events);
        }
        Err(err) => {
            let err = FetchError::from(err);
            warn!(from, to, %err, "history step failed, leaving state unchanged");
            let _ = events.send(BotEvent::Error { kind: ErrorKind::Fetch, cause: err.to_string() }).await;
        }
    }
}

async fn step_forward(tracker: &mut PositionTracker, gateway: &dyn ChainGateway, events: &mpsc::Sender<BotEvent>) {
    let current_tip = match retry_transient(DEFAULT_ATTEMPTS, || gateway.current_block(), liq_chain::ChainError::is_transient).await {
        Ok(tip) => tip,
        Err(err) => {
            let _ = events.send(BotEvent::Error { kind: ErrorKind::Fetch, cause: FetchError::from(err).to_string() }).await;
            return
        }
    };

    let Some((from, to)) = tracker.next_forward_window(current_tip) else { return };

    match retry_transient(DEFAULT_ATTEMPTS, || gateway.fetch_position_events(from, to), liq_chain::ChainError::is_transient).await {
        Ok(window_events) => {
            tracker.apply_forward_window(to, &window_events);
        }
        Err(err) => {
            let err = FetchError::from(err);
            warn!(from, to, %err, "forward step failed, leaving state unchanged");
            let _ = events.send(BotEvent::Error { kind: ErrorKind::Fetch, cause: err.to_string() }).await;
        }
    }
}
