//! `argv`/`.env` surface (spec.md §6). Parsing itself is out of scope for
//! the pipeline (spec.md §1 treats it as an external collaborator); this
//! module is the thin wrapper that builds a [`BotConfig`] from it, the
//! same split `bin/testnet/src/main.rs` and `bin/angstrom`'s `cli` module
//! draw between `clap::Parser` and the types the rest of the binary uses.

use std::time::Duration;

use alloy_primitives::Address;
use clap::Parser;
use liq_types::{
    config::ExchangeTarget, BotConfig, DeploymentVersion, ReportingMode, SignerConfig
};

#[derive(Parser, Debug)]
#[clap(about = "Liquidation bot for a derivatives exchange")]
pub struct Cli {
    /// JSON-RPC URL of the chain to monitor.
    #[clap(long, env = "LIQUIDATION_BOT_RPC_URL")]
    pub rpc_url: String,

    /// Human-readable network identifier, used only for logging and in
    /// `ConfigError::MissingLiquidationBotApiAddress` messages.
    #[clap(long, env = "LIQUIDATION_BOT_NETWORK")]
    pub network: String,

    /// Which exchange-contract schema this deployment speaks (spec.md
    /// §4.1): "v4" or "v4.1".
    #[clap(long, env = "LIQUIDATION_BOT_DEPLOYMENT_VERSION")]
    pub deployment_version: DeploymentVersionArg,

    /// Exchange address, v4 only.
    #[clap(long, env = "LIQUIDATION_BOT_EXCHANGE_ADDRESS")]
    pub exchange_address: Option<Address>,

    /// Trade-router address, v4.1 only.
    #[clap(long, env = "LIQUIDATION_BOT_TRADE_ROUTER")]
    pub trade_router: Option<Address>,

    /// Exchange-ledger address, v4.1 only.
    #[clap(long, env = "LIQUIDATION_BOT_EXCHANGE_LEDGER")]
    pub exchange_ledger: Option<Address>,

    /// Address of the on-chain `isLiquidatable` helper contract.
    #[clap(long, env = "LIQUIDATION_BOT_LIQUIDATION_BOT_API_ADDRESS")]
    pub liquidation_bot_api_address: Address,

    /// Block the exchange was deployed at; the Position Tracker's
    /// history backfill never looks earlier than this (spec.md §4.2).
    #[clap(long, env = "LIQUIDATION_BOT_EXCHANGE_LAUNCH_BLOCK")]
    pub exchange_launch_block: u64,

    #[clap(long, env = "LIQUIDATION_BOT_MAX_BLOCKS_PER_JSON_RPC_QUERY", default_value_t = BotConfig::DEFAULT_MAX_BLOCKS_PER_JSON_RPC_QUERY)]
    pub max_blocks_per_json_rpc_query: u64,

    #[clap(long, env = "LIQUIDATION_BOT_REFETCH_INTERVAL_SECS", default_value_t = BotConfig::DEFAULT_REFETCH_INTERVAL.as_secs())]
    pub refetch_interval_secs: u64,

    #[clap(long, env = "LIQUIDATION_BOT_RECHECK_INTERVAL_SECS", default_value_t = BotConfig::DEFAULT_RECHECK_INTERVAL.as_secs())]
    pub recheck_interval_secs: u64,

    #[clap(long, env = "LIQUIDATION_BOT_LIQUIDATION_RETRY_INTERVAL_SECS", default_value_t = BotConfig::DEFAULT_LIQUIDATION_RETRY_INTERVAL.as_secs())]
    pub liquidation_retry_interval_secs: u64,

    #[clap(long, env = "LIQUIDATION_BOT_LIQUIDATION_DELAY_SECS", default_value_t = BotConfig::DEFAULT_LIQUIDATION_DELAY.as_secs())]
    pub liquidation_delay_secs: u64,

    #[clap(long, env = "LIQUIDATION_BOT_MAX_TRADERS_PER_LIQUIDATION_CHECK", default_value_t = BotConfig::DEFAULT_MAX_TRADERS_PER_LIQUIDATION_CHECK)]
    pub max_traders_per_liquidation_check: usize,

    /// "console" or "metrics" (spec.md §4.6).
    #[clap(long, env = "LIQUIDATION_BOT_REPORTING", default_value = "console")]
    pub reporting: ReportingModeArg,

    /// Emit the console reporter's events as single-line JSON instead of
    /// human-readable text.
    #[clap(long, env = "LIQUIDATION_BOT_REPORTING_JSON", default_value_t = false)]
    pub reporting_json: bool,

    /// Listen address for the Prometheus exporter, used when `reporting
    /// = metrics`.
    #[clap(long, env = "LIQUIDATION_BOT_METRICS_LISTEN_ADDR", default_value = "0.0.0.0:9000")]
    pub metrics_listen_addr: std::net::SocketAddr,

    /// Raw private key, with or without a `0x` prefix. Mutually exclusive
    /// with `--mnemonic`.
    #[clap(long, env = "LIQUIDATION_BOT_PRIVATE_KEY")]
    pub private_key: Option<String>,

    /// BIP-39 mnemonic phrase. Mutually exclusive with `--private-key`.
    #[clap(long, env = "LIQUIDATION_BOT_MNEMONIC")]
    pub mnemonic: Option<String>,

    /// Account index to derive from `--mnemonic` (spec.md §6 HD path
    /// `m/44'/60'/0'/0/{n}`).
    #[clap(long, env = "LIQUIDATION_BOT_MNEMONIC_ACCOUNT_NUMBER", default_value_t = 0)]
    pub mnemonic_account_number: u32
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum DeploymentVersionArg {
    V4,
    V4_1
}

impl From<DeploymentVersionArg> for DeploymentVersion {
    fn from(value: DeploymentVersionArg) -> Self {
        match value {
            DeploymentVersionArg::V4 => DeploymentVersion::V4,
            DeploymentVersionArg::V4_1 => DeploymentVersion::V4_1
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ReportingModeArg {
    Console,
    Metrics
}

impl From<ReportingModeArg> for ReportingMode {
    fn from(value: ReportingModeArg) -> Self {
        match value {
            ReportingModeArg::Console => ReportingMode::Console,
            ReportingModeArg::Metrics => ReportingMode::Metrics
        }
    }
}

impl Cli {
    /// Assembles the exchange-target half of [`BotConfig`] (spec.md §6):
    /// a single address for v4, a `(tradeRouter, exchangeLedger)` pair
    /// for v4.1. Missing fields are left as the zero address;
    /// `BotConfig::validate` is what refuses to start on those.
    fn exchange_target(&self) -> ExchangeTarget {
        match DeploymentVersion::from(self.deployment_version) {
            DeploymentVersion::V4 => ExchangeTarget::Single(self.exchange_address.unwrap_or(Address::ZERO)),
            DeploymentVersion::V4_1 => ExchangeTarget::Pair {
                trade_router: self.trade_router.unwrap_or(Address::ZERO),
                exchange_ledger: self.exchange_ledger.unwrap_or(Address::ZERO)
            }
        }
    }

    /// Assembles the signer half of [`BotConfig`]. Neither flag set is a
    /// `ConfigError::MissingSigner`, caught before `BotConfig::validate`
    /// runs since the signer shape itself (not just its contents) is
    /// missing.
    fn signer(&self) -> eyre::Result<SignerConfig> {
        match (&self.private_key, &self.mnemonic) {
            (Some(key), None) => Ok(SignerConfig::PrivateKey(key.clone())),
            (None, Some(phrase)) => {
                Ok(SignerConfig::Mnemonic { phrase: phrase.clone(), account_number: self.mnemonic_account_number })
            }
            (None, None) => Err(liq_types::ConfigError::MissingSigner.into()),
            (Some(_), Some(_)) => Err(eyre::eyre!("provide either --private-key or --mnemonic, not both"))
        }
    }

    pub fn into_config(self) -> eyre::Result<BotConfig> {
        let exchange = self.exchange_target();
        let signer = self.signer()?;

        Ok(BotConfig {
            network: self.network,
            deployment_version: self.deployment_version.into(),
            exchange,
            liquidation_bot_api_address: self.liquidation_bot_api_address,
            exchange_launch_block: self.exchange_launch_block,
            max_blocks_per_json_rpc_query: self.max_blocks_per_json_rpc_query,
            refetch_interval: Duration::from_secs(self.refetch_interval_secs),
            recheck_interval: Duration::from_secs(self.recheck_interval_secs),
            liquidation_retry_interval: Duration::from_secs(self.liquidation_retry_interval_secs),
            liquidation_delay: Duration::from_secs(self.liquidation_delay_secs),
            max_traders_per_liquidation_check: self.max_traders_per_liquidation_check,
            reporting: self.reporting.into(),
            signer
        })
    }
}
