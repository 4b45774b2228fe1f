//! Metrics wrapper for the bot, the same shape as the teacher's
//! `ConsensusMetricsWrapper` (referenced from `consensus/round_state.rs`):
//! a small typed facade over the `metrics` crate's macros so call sites
//! never type a raw metric name.

use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

const OPEN_POSITIONS: &str = "liquidation_bot_open_positions";
const HISTORY_BLOCKS_LEFT: &str = "liquidation_bot_history_blocks_left";
const LIQUIDATABLE_FOUND: &str = "liquidation_bot_liquidatable_total";
const LIQUIDATIONS_SUCCEEDED: &str = "liquidation_bot_liquidations_succeeded_total";
const LIQUIDATIONS_FAILED: &str = "liquidation_bot_liquidations_failed_total";
const CHECK_ERRORS: &str = "liquidation_bot_check_errors_total";
const CHAIN_CALL_LATENCY: &str = "liquidation_bot_chain_call_latency_seconds";

/// Handle for recording bot-wide metrics. Cloning is cheap: the `metrics`
/// crate's macros dispatch to a global recorder, this type just names the
/// call sites.
#[derive(Debug, Clone, Copy, Default)]
pub struct BotMetrics;

impl BotMetrics {
    /// Installs the Prometheus recorder and starts its HTTP exporter.
    /// Mirrors how `reth-metrics`-based binaries wire up an exporter in
    /// `main`.
    pub fn install_prometheus_exporter(listen_addr: std::net::SocketAddr) -> eyre::Result<Self> {
        PrometheusBuilder::new()
            .with_http_listener(listen_addr)
            .install()
            .map_err(|err| eyre::eyre!("failed to install prometheus exporter: {err}"))?;
        Ok(Self)
    }

    pub fn record_open_positions(&self, count: usize) {
        gauge!(OPEN_POSITIONS).set(count as f64);
    }

    pub fn record_history_blocks_left(&self, blocks: u64) {
        gauge!(HISTORY_BLOCKS_LEFT).set(blocks as f64);
    }

    pub fn record_liquidatable_found(&self, count: usize) {
        counter!(LIQUIDATABLE_FOUND).increment(count as u64);
    }

    pub fn record_check_error(&self) {
        counter!(CHECK_ERRORS).increment(1);
    }

    pub fn record_liquidation_succeeded(&self) {
        counter!(LIQUIDATIONS_SUCCEEDED).increment(1);
    }

    pub fn record_liquidation_failed(&self) {
        counter!(LIQUIDATIONS_FAILED).increment(1);
    }

    pub fn record_chain_call_latency(&self, op: &'static str, elapsed: Duration) {
        histogram!(CHAIN_CALL_LATENCY, "op" => op).record(elapsed.as_secs_f64());
    }
}
