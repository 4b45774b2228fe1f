//! Liquidator (spec.md §4.4): submits liquidation transactions for
//! eligible traders and arbitrates retries against fresh liquidatability
//! checks.

pub mod error;
pub mod pending;
pub mod task;

pub use error::LiquidationError;
pub use pending::Pending;
pub use task::run_liquidator;
