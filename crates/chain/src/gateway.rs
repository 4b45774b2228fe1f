//! The production [`ChainGateway`] implementation, built on `alloy`'s
//! JSON-RPC provider. This is the only module in the workspace that knows
//! about the v4/v4.1 schema split (spec.md §4.1/§9).

use alloy_network::{Ethereum, TransactionBuilder};
use alloy_primitives::{Address, I256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::{Filter, TransactionRequest};
use alloy_sol_types::{SolCall, SolEvent};
use async_trait::async_trait;
use liq_metrics::BotMetrics;
use liq_types::{
    config::ExchangeTarget,
    contracts::{Exchange, LiquidationBotApi, LiquidationBotApiV2, PositionChangedV4, PositionChangedV41},
    DeploymentVersion, PositionChange, PositionKind
};
use liq_utils::timer::async_time_fn;
use tracing::instrument;

use crate::{
    error::ChainError,
    types::{Receipt, TxHandle}
};

/// Hides the v4/v4.1 schema split behind [`crate::ChainGateway`].
///
/// `P` is the JSON-RPC provider the bot was configured to dial; the
/// gateway never constructs its own transport, matching the teacher's
/// convention of taking an already-built `Provider` (see
/// `consensus/round_state.rs`'s `RoundStateMachine::new`).
#[derive(Clone)]
pub struct AlloyChainGateway<P> {
    provider: P,
    version: DeploymentVersion,
    exchange: ExchangeTarget,
    liquidation_bot_api_address: Address,
    metrics: Option<BotMetrics>
}

impl<P> AlloyChainGateway<P>
where
    P: Provider<Ethereum> + Clone + Send + Sync + 'static
{
    pub fn new(provider: P, version: DeploymentVersion, exchange: ExchangeTarget, liquidation_bot_api_address: Address) -> Self {
        Self { provider, version, exchange, liquidation_bot_api_address, metrics: None }
    }

    pub fn with_metrics(mut self, metrics: BotMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    async fn timed<T>(&self, op: &'static str, fut: impl std::future::Future<Output = T>) -> T {
        let (result, elapsed) = async_time_fn(|| fut).await;
        if let Some(metrics) = self.metrics {
            metrics.record_chain_call_latency(op, elapsed);
        }
        result
    }

    fn exchange_address(&self) -> Address {
        match self.exchange {
            ExchangeTarget::Single(addr) => addr,
            // the risk-relevant ledger, not the router, is what the
            // liquidation-check and liquidate calls target under v4.1
            ExchangeTarget::Pair { exchange_ledger, .. } => exchange_ledger
        }
    }

    fn decode_v4(log: &alloy_rpc_types_eth::Log) -> Result<PositionChange, ChainError> {
        let event = PositionChangedV4::decode_log(&log.inner, true)
            .map_err(|err| ChainError::Transient(format!("failed to decode v4 PositionChanged log: {err}")))?;
        let tx_index = log
            .transaction_index
            .ok_or_else(|| ChainError::Transient("log missing transaction_index".to_string()))?;
        let block = log
            .block_number
            .ok_or_else(|| ChainError::Transient("log missing block_number".to_string()))?;

        Ok(PositionChange {
            trader: event.trader,
            block,
            tx_index: tx_index as u32,
            kind: classify(event.previousAsset, event.previousStable, event.newAsset, event.newStable)
        })
    }

    fn decode_v41(log: &alloy_rpc_types_eth::Log) -> Result<PositionChange, ChainError> {
        let event = PositionChangedV41::decode_log(&log.inner, true)
            .map_err(|err| ChainError::Transient(format!("failed to decode v4.1 PositionChanged log: {err}")))?;
        let tx_index = log
            .transaction_index
            .ok_or_else(|| ChainError::Transient("log missing transaction_index".to_string()))?;
        let block = log
            .block_number
            .ok_or_else(|| ChainError::Transient("log missing block_number".to_string()))?;
        let cpd = &event.cpd;

        Ok(PositionChange {
            trader: cpd.trader,
            block,
            tx_index: tx_index as u32,
            kind: classify(cpd.startAsset, cpd.startStable, cpd.totalAsset, cpd.totalStable)
        })
    }
}

/// Decode rule common to both schema variants (spec.md §6): `Opened` when
/// both pre-trade legs are zero, `Closed` when both post-trade legs are
/// zero, `Modified` otherwise.
fn classify(pre_asset: I256, pre_stable: I256, post_asset: I256, post_stable: I256) -> PositionKind {
    if pre_asset.is_zero() && pre_stable.is_zero() {
        PositionKind::Opened
    } else if post_asset.is_zero() && post_stable.is_zero() {
        PositionKind::Closed
    } else {
        PositionKind::Modified
    }
}

#[async_trait]
impl<P> crate::ChainGateway for AlloyChainGateway<P>
where
    P: Provider<Ethereum> + Clone + Send + Sync + 'static
{
    #[instrument(skip(self))]
    async fn current_block(&self) -> Result<u64, ChainError> {
        self.timed("current_block", async {
            self.provider.get_block_number().await.map_err(|err| ChainError::Transient(err.to_string()))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn fetch_position_events(&self, from: u64, to: u64) -> Result<Vec<PositionChange>, ChainError> {
        self.timed("fetch_position_events", async {
            let filter = Filter::new().address(self.exchange_address()).from_block(from).to_block(to);

            let filter = match self.version {
                DeploymentVersion::V4 => filter.event_signature(PositionChangedV4::SIGNATURE_HASH),
                DeploymentVersion::V4_1 => filter.event_signature(PositionChangedV41::SIGNATURE_HASH)
            };

            let logs = self
                .provider
                .get_logs(&filter)
                .await
                .map_err(|err| ChainError::Transient(err.to_string()))?;

            let mut events = logs
                .iter()
                .map(|log| match self.version {
                    DeploymentVersion::V4 => Self::decode_v4(log),
                    DeploymentVersion::V4_1 => Self::decode_v41(log)
                })
                .collect::<Result<Vec<_>, _>>()?;

            events.sort_by_key(PositionChange::order_key);
            Ok(events)
        })
        .await
    }

    #[instrument(skip(self, batch))]
    async fn is_liquidatable(&self, batch: &[Address]) -> Result<Vec<bool>, ChainError> {
        self.timed("is_liquidatable", async {
            let exchange = self.exchange_address();
            let traders = batch.to_vec();

            let calldata = match self.version {
                DeploymentVersion::V4 => LiquidationBotApi::isLiquidatableCall { exchange, traders }.abi_encode(),
                DeploymentVersion::V4_1 => LiquidationBotApiV2::isLiquidatableCall { exchange, traders }.abi_encode()
            };

            let tx = TransactionRequest::default()
                .with_to(self.liquidation_bot_api_address)
                .with_input(calldata);

            let raw = self
                .provider
                .call(&tx)
                .await
                .map_err(|err| ChainError::Transient(err.to_string()))?;

            let result = match self.version {
                DeploymentVersion::V4 => LiquidationBotApi::isLiquidatableCall::abi_decode_returns(&raw, true),
                DeploymentVersion::V4_1 => LiquidationBotApiV2::isLiquidatableCall::abi_decode_returns(&raw, true)
            }
            .map_err(|err| ChainError::Transient(format!("malformed isLiquidatable response: {err}")))?;

            Ok(result._0)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn liquidate(&self, trader: Address) -> Result<TxHandle, ChainError> {
        self.timed("liquidate", async {
            let calldata = Exchange::liquidateCall { trader }.abi_encode();
            let tx = TransactionRequest::default().with_to(self.exchange_address()).with_input(calldata);

            let pending = self.provider.send_transaction(tx).await.map_err(classify_send_error)?;

            Ok(TxHandle { tx_hash: *pending.tx_hash() })
        })
        .await
    }

    #[instrument(skip(self))]
    async fn await_receipt(&self, handle: TxHandle) -> Result<Receipt, ChainError> {
        self.timed("await_receipt", async {
            let receipt = self
                .provider
                .get_transaction_receipt(handle.tx_hash)
                .await
                .map_err(|err| ChainError::Transient(err.to_string()))?
                .ok_or_else(|| ChainError::Transient(format!("receipt for {} not yet available", handle.tx_hash)))?;

            Ok(Receipt { tx_hash: handle.tx_hash, status: receipt.status() })
        })
        .await
    }
}

fn classify_send_error(err: alloy_transport::RpcError<alloy_transport::TransportErrorKind>) -> ChainError {
    let message = err.to_string();
    if message.contains("revert") {
        ChainError::Revert(message)
    } else if message.contains("replaced") || message.contains("nonce too low") {
        ChainError::Replaced(message)
    } else {
        ChainError::Transient(message)
    }
}
