//! Fatal error taxonomy (spec.md §7): `ConfigError` and `InternalError`
//! propagate through the cancellation token and stop the process. Every
//! other error named in §7 (`FetchError`, `CheckError`,
//! `LiquidationError`, the chain-level `TransientChainError` /
//! `RevertError` / `ReplacedError`) lives next to the stage that raises
//! it, since those never escape as anything but an `Error` event.

use thiserror::Error;

/// Bad startup parameters. Fatal: the process exits with a non-zero
/// status before the pipeline starts (spec.md §7).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("deploymentVersion {version} has no configured liquidationBotApiAddress for network {network}")]
    MissingLiquidationBotApiAddress { network: String, version: String },

    #[error("exchangeAddress must be set for deploymentVersion {0}")]
    MissingExchangeAddress(String),

    #[error("mnemonic accountNumber {0} is outside the supported range [0, 199]")]
    AccountNumberOutOfRange(u32),

    #[error("maxBlocksPerJsonRpcQuery must be greater than zero")]
    ZeroBlockWindow,

    #[error("maxTradersPerLiquidationCheck must be greater than zero")]
    ZeroCheckChunkSize,

    #[error("signer configuration is missing: provide a private key or a mnemonic")]
    MissingSigner
}

/// An invariant violation, e.g. the liquidation-check contract returning a
/// result array of the wrong length. Fatal: the pipeline stops and emits a
/// final `Error` event before exit (spec.md §7).
#[derive(Debug, Error)]
pub enum InternalError {
    #[error("isLiquidatable returned {got} results for {expected} traders")]
    LiquidatableResultLengthMismatch { expected: usize, got: usize }
}
