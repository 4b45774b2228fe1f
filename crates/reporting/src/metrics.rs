//! Metrics-and-counters reporter, the "metrics" option from spec.md
//! §6/§4.6, backed by `liq-metrics`'s Prometheus facade.

use liq_metrics::BotMetrics;
use liq_types::{BotEvent, ErrorKind};

pub struct MetricsReporter {
    metrics: BotMetrics
}

impl MetricsReporter {
    pub fn new(metrics: BotMetrics) -> Self {
        Self { metrics }
    }
}

#[async_trait::async_trait]
impl liq_coordinator::Reporter for MetricsReporter {
    async fn report(&mut self, event: BotEvent) {
        match event {
            BotEvent::TradersFetched { count, history_blocks_left, .. } => {
                self.metrics.record_open_positions(count);
                self.metrics.record_history_blocks_left(history_blocks_left);
            }
            BotEvent::TradersChecked { liquidatable } => {
                self.metrics.record_liquidatable_found(liquidatable.len());
            }
            BotEvent::TraderLiquidated { .. } => {
                self.metrics.record_liquidation_succeeded();
            }
            BotEvent::Error { kind: ErrorKind::Check, .. } => {
                self.metrics.record_check_error();
            }
            BotEvent::Error { kind: ErrorKind::Liquidation, .. } => {
                self.metrics.record_liquidation_failed();
            }
            BotEvent::Error { .. } | BotEvent::BotStopped => {}
        }
    }
}
