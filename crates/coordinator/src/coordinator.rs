//! Wires the three pipeline stages together (spec.md §4.5): bounded
//! handoffs, one shared cancellation token, and a fanned-out event stream.

use std::sync::Arc;

use liq_chain::ChainGateway;
use liq_checker::run_checker;
use liq_liquidator::run_liquidator;
use liq_tracker::run_tracker;
use liq_types::{BotConfig, BotEvent, InternalError};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{event_bus::run_event_bus, reporter::Reporter};

/// Event channel capacity. Best-effort delivery (spec.md §4.6) is
/// implemented by bounding this and using `try_send` at every producer, so
/// a slow reporter coalesces backlog by dropping rather than blocking
/// chain I/O.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

pub struct Coordinator {
    gateway: Arc<dyn ChainGateway>,
    config:  BotConfig
}

impl Coordinator {
    pub fn new(gateway: Arc<dyn ChainGateway>, config: BotConfig) -> Self {
        Self { gateway, config }
    }

    /// Runs every stage concurrently until `cancel` fires or a stage hits
    /// a fatal [`InternalError`] (which cancels every other stage too).
    /// Emits a terminal [`BotEvent::BotStopped`] once every stage has
    /// exited, then returns.
    pub async fn run<R>(self, make_reporter: impl FnMut() -> R + Send + 'static, cancel: CancellationToken) -> Result<(), InternalError>
    where
        R: Reporter
    {
        let (open_positions_tx, open_positions_rx) = watch::channel(Vec::new());
        let (liquidatable_tx, liquidatable_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let bus_handle = tokio::spawn(run_event_bus(events_rx, make_reporter, cancel.clone()));

        let tracker_handle = tokio::spawn(run_tracker(
            self.gateway.clone(),
            self.config.exchange_launch_block,
            self.config.max_blocks_per_json_rpc_query,
            self.config.refetch_interval,
            open_positions_tx,
            events_tx.clone(),
            cancel.clone()
        ));

        let checker_handle = tokio::spawn(run_checker(
            self.gateway.clone(),
            open_positions_rx,
            self.config.max_traders_per_liquidation_check,
            self.config.recheck_interval,
            liquidatable_tx,
            events_tx.clone(),
            cancel.clone()
        ));

        let liquidator_handle = tokio::spawn(run_liquidator(
            self.gateway.clone(),
            liquidatable_rx,
            self.config.liquidation_delay,
            self.config.liquidation_retry_interval,
            events_tx.clone(),
            cancel.clone()
        ));

        let _ = tracker_handle.await;
        let checker_result = checker_handle.await.unwrap_or(Ok(()));
        let liquidator_result = liquidator_handle.await.unwrap_or(Ok(()));

        let _ = events_tx.send(BotEvent::BotStopped).await;
        drop(events_tx);
        let _ = bus_handle.await;

        info!("coordinator stopped all stages");
        checker_result?;
        liquidator_result?;
        Ok(())
    }
}
