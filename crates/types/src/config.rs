//! Bot configuration (spec.md §6). Sourcing these values from `argv`/`.env`
//! is out of scope (spec.md §1 treats CLI parsing and `.env` loading as
//! external collaborators) — this module only owns the validated shape.

use std::time::Duration;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The two supported exchange-contract schema variants (spec.md §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentVersion {
    V4,
    V4_1
}

impl std::fmt::Display for DeploymentVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V4 => write!(f, "v4"),
            Self::V4_1 => write!(f, "v4.1")
        }
    }
}

/// `reporting` (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReportingMode {
    #[default]
    Console,
    Metrics
}

/// Signer configuration shape (spec.md §6). Building the actual
/// `alloy::signers::Signer`/wallet from this is delegated to `liq-chain`
/// behind a narrow seam; constructing it here would pull wallet/keystore
/// concerns into the shared types crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SignerConfig {
    PrivateKey(String),
    Mnemonic { phrase: String, account_number: u32 }
}

impl SignerConfig {
    /// HD derivation path for a mnemonic signer (spec.md §6):
    /// `m/44'/60'/0'/0/{account_number}`.
    pub fn hd_path(account_number: u32) -> String {
        format!("m/44'/60'/0'/0/{account_number}")
    }
}

/// Either a single exchange address (v4) or the `(tradeRouter,
/// exchangeLedger)` pair (v4.1), per spec.md §6.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ExchangeTarget {
    Single(Address),
    Pair { trade_router: Address, exchange_ledger: Address }
}

/// Per spec.md §6's enumerated configuration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub network: String,
    pub deployment_version: DeploymentVersion,
    pub exchange: ExchangeTarget,
    pub liquidation_bot_api_address: Address,
    pub exchange_launch_block: u64,
    pub max_blocks_per_json_rpc_query: u64,
    #[serde(with = "humantime_serde")]
    pub refetch_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub recheck_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub liquidation_retry_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub liquidation_delay: Duration,
    pub max_traders_per_liquidation_check: usize,
    pub reporting: ReportingMode,
    pub signer: SignerConfig
}

impl BotConfig {
    pub const DEFAULT_MAX_BLOCKS_PER_JSON_RPC_QUERY: u64 = 50_000;
    pub const DEFAULT_REFETCH_INTERVAL: Duration = Duration::from_secs(20);
    pub const DEFAULT_RECHECK_INTERVAL: Duration = Duration::from_secs(5);
    pub const DEFAULT_LIQUIDATION_RETRY_INTERVAL: Duration = Duration::from_secs(1);
    pub const DEFAULT_LIQUIDATION_DELAY: Duration = Duration::ZERO;
    pub const DEFAULT_MAX_TRADERS_PER_LIQUIDATION_CHECK: usize = 1000;

    /// Validates the configuration, refusing to start rather than dialing
    /// an empty address (spec.md §9's open question on the v4/v4.1 default
    /// address table).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.liquidation_bot_api_address.is_zero() {
            return Err(ConfigError::MissingLiquidationBotApiAddress {
                network: self.network.clone(),
                version: self.deployment_version.to_string()
            })
        }

        match self.exchange {
            ExchangeTarget::Single(addr) if addr.is_zero() => {
                return Err(ConfigError::MissingExchangeAddress(self.deployment_version.to_string()))
            }
            ExchangeTarget::Pair { trade_router, exchange_ledger }
                if trade_router.is_zero() || exchange_ledger.is_zero() =>
            {
                return Err(ConfigError::MissingExchangeAddress(self.deployment_version.to_string()))
            }
            _ => {}
        }

        if let SignerConfig::Mnemonic { account_number, .. } = &self.signer {
            if *account_number > 199 {
                return Err(ConfigError::AccountNumberOutOfRange(*account_number))
            }
        }

        if self.max_blocks_per_json_rpc_query == 0 {
            return Err(ConfigError::ZeroBlockWindow)
        }

        if self.max_traders_per_liquidation_check == 0 {
            return Err(ConfigError::ZeroCheckChunkSize)
        }

        Ok(())
    }
}
