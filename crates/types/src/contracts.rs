//! Wire-level contract bindings (spec.md §6), generated with
//! [`alloy_sol_macro::sol!`] the way `angstrom-types` generates bindings for
//! the exchange's own orders (see `primitive/contract/angstrom.rs` in the
//! teacher repo).
//!
//! Two schema variants of the same event exist on-chain: v4 reports the
//! four leg fields directly on the event, v4.1 nests them inside a `cpd`
//! struct parameter. Both are declared here; [`liq-chain`] is the only
//! crate that picks between them.

use alloy_sol_types::sol;

sol! {
    #![sol(all_derives = true)]

    /// v4 position-changed event: four flat leg-size fields.
    event PositionChangedV4(
        address indexed trader,
        int256 previousAsset,
        int256 previousStable,
        int256 newAsset,
        int256 newStable
    );

    /// v4.1 nests the leg sizes inside `cpd`.
    struct ChangePositionData {
        address trader;
        int256 startAsset;
        int256 startStable;
        int256 totalAsset;
        int256 totalStable;
    }

    event PositionChangedV41(ChangePositionData cpd);

    /// The v4 liquidation-check contract.
    interface LiquidationBotApi {
        function isLiquidatable(address exchange, address[] calldata traders)
            external
            view
            returns (bool[] memory);
    }

    /// The v4.1 liquidation-check contract. Same ABI shape as v4 today, kept
    /// as a distinct binding because the two versions are not guaranteed to
    /// stay wire-compatible (spec.md §4.1).
    interface LiquidationBotApiV2 {
        function isLiquidatable(address exchange, address[] calldata traders)
            external
            view
            returns (bool[] memory);
    }

    /// The exchange contract's liquidation entrypoint, common to both
    /// deployment versions.
    interface Exchange {
        function liquidate(address trader) external;
    }
}
