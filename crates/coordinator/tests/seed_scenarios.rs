//! The six end-to-end seed scenarios from spec.md §8, each driven against
//! a scripted [`MockChainGateway`] through the real `Coordinator`.

use std::{
    sync::{Arc, Mutex},
    time::Duration
};

use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;
use liq_chain::{mock::MockChainGateway, ChainError, ChainGateway};
use liq_coordinator::{Coordinator, Reporter};
use liq_types::{
    config::{ExchangeTarget, ReportingMode, SignerConfig},
    BotConfig, BotEvent, DeploymentVersion, PositionChange, PositionKind
};
use tokio_util::sync::CancellationToken;

/// Collects every event it sees, for assertion after the run.
#[derive(Clone, Default)]
struct CollectingReporter {
    events: Arc<Mutex<Vec<BotEvent>>>
}

#[async_trait]
impl Reporter for CollectingReporter {
    async fn report(&mut self, event: BotEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn test_config(genesis: u64) -> BotConfig {
    BotConfig {
        network: "test".to_string(),
        deployment_version: DeploymentVersion::V4,
        exchange: ExchangeTarget::Single(Address::with_last_byte(0xEE)),
        liquidation_bot_api_address: Address::with_last_byte(0xAA),
        exchange_launch_block: genesis,
        max_blocks_per_json_rpc_query: 1_000_000,
        refetch_interval: Duration::from_millis(15),
        recheck_interval: Duration::from_millis(10),
        liquidation_retry_interval: Duration::from_millis(5),
        liquidation_delay: Duration::ZERO,
        max_traders_per_liquidation_check: 1000,
        reporting: ReportingMode::Console,
        signer: SignerConfig::PrivateKey("0x00".to_string())
    }
}

fn change(trader: Address, block: u64, tx_index: u32, kind: PositionKind) -> PositionChange {
    PositionChange { trader, block, tx_index, kind }
}

/// Runs the coordinator for up to `window` against `gateway`, collecting
/// every event emitted, then cancels and waits for clean shutdown.
async fn run_for(gateway: MockChainGateway, config: BotConfig, window: Duration) -> Vec<BotEvent> {
    let collected = Arc::new(Mutex::new(Vec::new()));
    let reporter_events = collected.clone();

    let gateway: Arc<dyn ChainGateway> = Arc::new(gateway);
    let coordinator = Coordinator::new(gateway, config);
    let cancel = CancellationToken::new();
    let run_cancel = cancel.clone();

    let handle = tokio::spawn(async move {
        coordinator
            .run(move || CollectingReporter { events: reporter_events.clone() }, run_cancel)
            .await
    });

    tokio::time::sleep(window).await;
    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;

    let events = collected.lock().unwrap().clone();
    events
}

fn liquidated_traders(events: &[BotEvent]) -> Vec<Address> {
    events
        .iter()
        .filter_map(|event| match event {
            BotEvent::TraderLiquidated { trader, .. } => Some(*trader),
            _ => None
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_liquidatable_trader_is_liquidated() {
    let trader1 = Address::with_last_byte(1);
    let gateway = MockChainGateway::new();
    gateway.set_current_block(100);
    gateway.push_position_events(vec![change(trader1, 10, 0, PositionKind::Opened)]);
    gateway.push_position_events(vec![]);
    gateway.push_liquidatable(vec![true]);
    gateway.push_liquidate_ok(TxHash::repeat_byte(1));
    gateway.push_receipt(TxHash::repeat_byte(1), true);

    let events = run_for(gateway, test_config(0), Duration::from_millis(300)).await;

    let liquidated = liquidated_traders(&events);
    assert_eq!(liquidated, vec![trader1]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn non_liquidatable_trader_is_never_liquidated() {
    let trader1 = Address::with_last_byte(1);
    let gateway = MockChainGateway::new();
    gateway.set_current_block(100);
    gateway.push_position_events(vec![change(trader1, 10, 0, PositionKind::Opened)]);
    gateway.push_position_events(vec![]);
    gateway.push_liquidatable(vec![false]);

    let events = run_for(gateway, test_config(0), Duration::from_millis(300)).await;

    assert!(liquidated_traders(&events).is_empty());
    assert!(events.iter().any(|event| matches!(event, BotEvent::TradersChecked { liquidatable } if liquidatable.is_empty())));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn trader_closed_before_liquidation_drops_out_of_the_open_set() {
    let trader1 = Address::with_last_byte(1);
    let gateway = MockChainGateway::new();
    gateway.set_current_block(100);
    gateway.push_position_events(vec![change(trader1, 10, 0, PositionKind::Opened), change(trader1, 11, 0, PositionKind::Closed)]);
    gateway.push_position_events(vec![]);
    gateway.push_liquidatable(vec![]);

    let events = run_for(gateway, test_config(0), Duration::from_millis(300)).await;

    assert!(liquidated_traders(&events).is_empty());
    let last_fetched = events.iter().rev().find_map(|event| match event {
        BotEvent::TradersFetched { count, .. } => Some(*count),
        _ => None
    });
    // trader1 is still tracked (it has a PositionState), just not open;
    // the count reflects tracked traders, open-set emptiness is asserted
    // via the absence of any liquidation.
    assert!(last_fetched.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mixed_batch_liquidates_only_the_eligible_trader() {
    let trader1 = Address::with_last_byte(1);
    let trader2 = Address::with_last_byte(2);
    let gateway = MockChainGateway::new();
    gateway.set_current_block(100);
    gateway.push_position_events(vec![change(trader1, 10, 0, PositionKind::Opened), change(trader2, 10, 1, PositionKind::Opened)]);
    gateway.push_position_events(vec![]);
    gateway.push_liquidatable(vec![false, true]);
    gateway.push_liquidate_ok(TxHash::repeat_byte(2));
    gateway.push_receipt(TxHash::repeat_byte(2), true);

    let events = run_for(gateway, test_config(0), Duration::from_millis(300)).await;

    assert_eq!(liquidated_traders(&events), vec![trader2]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn chunk_boundary_traders_are_all_liquidated() {
    const TOTAL: usize = 5000;
    const CHUNK: usize = 1000;

    let traders: Vec<Address> = (0..TOTAL)
        .map(|i| {
            let mut bytes = [0u8; 20];
            bytes[16..].copy_from_slice(&(i as u32).to_be_bytes());
            Address::from(bytes)
        })
        .collect();

    let opens: Vec<PositionChange> = traders.iter().enumerate().map(|(i, &addr)| change(addr, 10, i as u32, PositionKind::Opened)).collect();

    let targets: Vec<Address> = (0..5).map(|chunk| traders[chunk * CHUNK + 1]).collect();

    let gateway = MockChainGateway::new();
    gateway.set_current_block(100);
    gateway.push_position_events(opens);
    gateway.push_position_events(vec![]);

    for chunk in 0..5 {
        let mut flags = vec![false; CHUNK];
        flags[1] = true;
        gateway.push_liquidatable(flags);
        let _ = chunk;
    }

    for target in &targets {
        gateway.push_liquidate_ok(TxHash::from(target.into_word()));
    }
    for target in &targets {
        gateway.push_receipt(TxHash::from(target.into_word()), true);
    }

    let events = run_for(gateway, BotConfig { max_traders_per_liquidation_check: CHUNK, ..test_config(0) }, Duration::from_millis(500)).await;

    let mut liquidated = liquidated_traders(&events);
    liquidated.sort();
    let mut expected = targets.clone();
    expected.sort();
    assert_eq!(liquidated, expected, "every chunk-boundary trader must eventually be liquidated, with no loss");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn a_reverted_liquidation_is_retried_and_then_succeeds() {
    let trader1 = Address::with_last_byte(1);
    let gateway = MockChainGateway::new();
    gateway.set_current_block(100);
    gateway.push_position_events(vec![change(trader1, 10, 0, PositionKind::Opened)]);
    gateway.push_position_events(vec![]);
    gateway.push_liquidatable(vec![true]);
    gateway.push_liquidatable(vec![true]);
    gateway.push_liquidate_error(ChainError::Revert("undercollateralized check failed on-chain".to_string()));
    gateway.push_liquidate_ok(TxHash::repeat_byte(9));
    gateway.push_receipt(TxHash::repeat_byte(9), true);

    let events = run_for(gateway, test_config(0), Duration::from_millis(300)).await;

    let liquidated = liquidated_traders(&events);
    assert_eq!(liquidated, vec![trader1], "no duplicate TraderLiquidated for the same trader");
    let errors = events.iter().filter(|event| matches!(event, BotEvent::Error { .. })).count();
    assert!(errors >= 1, "the revert must surface as an Error event before the retry succeeds");
}
