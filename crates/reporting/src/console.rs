//! Plain-text (and optionally JSON) console reporter, the "console"
//! option from spec.md §6/§4.6. One of the two external-collaborator
//! reporters the spec names but scopes the concrete implementation of
//! out; it's carried here as ambient logging infrastructure.

use liq_types::{lowercase_hex, BotEvent, ErrorKind};
use tracing::{error, info, warn};

/// Logs every event through `tracing`. With `json: true`, events are
/// rendered as single-line JSON instead of the human-readable form, for
/// log-aggregation pipelines.
pub struct ConsoleReporter {
    json: bool
}

impl ConsoleReporter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

#[async_trait::async_trait]
impl liq_coordinator::Reporter for ConsoleReporter {
    async fn report(&mut self, event: BotEvent) {
        if self.json {
            match serde_json::to_string(&event) {
                Ok(line) => info!(target: "liquidation_bot::events", "{line}"),
                Err(err) => warn!(%err, "failed to serialize event as json")
            }
            return
        }

        match event {
            BotEvent::TradersFetched { count, history_complete, history_blocks_left } => {
                info!(count, history_complete, history_blocks_left, "position tracker progress");
            }
            BotEvent::TradersChecked { liquidatable } => {
                info!(liquidatable = liquidatable.len(), "liquidatability scan chunk complete");
            }
            BotEvent::TraderLiquidated { trader, tx_hash } => {
                info!(trader = %lowercase_hex(&trader), %tx_hash, "trader liquidated");
            }
            BotEvent::Error { kind, cause } => match kind {
                ErrorKind::Internal | ErrorKind::ReporterCrash => error!(?kind, cause, "pipeline error"),
                _ => warn!(?kind, cause, "pipeline error")
            },
            BotEvent::BotStopped => info!("bot stopped")
        }
    }
}
