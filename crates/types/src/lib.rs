//! Shared data model for the liquidation bot.
//!
//! This crate holds the types every pipeline stage agrees on: the
//! trader/position model (§3), the progress event stream consumed by
//! reporters (§4.6), bot configuration (§6) and the contract bindings
//! the [`liq-chain`](https://docs.rs/liq-chain) gateway decodes against.

pub mod config;
pub mod contracts;
pub mod error;
pub mod events;
pub mod position;

pub use alloy_primitives::Address;
pub use config::{BotConfig, DeploymentVersion, ReportingMode, SignerConfig};
pub use error::{ConfigError, InternalError};
pub use events::{BotEvent, ErrorKind};
pub use position::{PositionChange, PositionKind, PositionState};

/// Renders an [`Address`] the way spec.md §3 requires: lowercase hex,
/// no EIP-55 checksum casing (alloy's `Display` impl checksums by
/// default, so we go through the raw bytes instead).
pub fn lowercase_hex(address: &Address) -> String {
    format!("0x{}", alloy_primitives::hex::encode(address.as_slice()))
}
