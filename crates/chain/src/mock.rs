//! An in-memory [`crate::ChainGateway`] used by the coordinator's seed
//! scenario tests, mirroring the `MockValidator` pattern the teacher uses
//! for its own trait-behind-a-mock tests.

use std::collections::{HashMap, HashSet, VecDeque};

use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;
use liq_types::PositionChange;
use parking_lot::Mutex;

use crate::{
    error::ChainError,
    types::{Receipt, TxHandle}
};

#[derive(Default)]
struct MockState {
    current_block: u64,
    /// Queued `(from, to) -> events` responses for `fetch_position_events`,
    /// consumed in order regardless of the requested range.
    position_events: VecDeque<Result<Vec<PositionChange>, ChainError>>,
    liquidatable: VecDeque<Result<Vec<bool>, ChainError>>,
    liquidate: VecDeque<Result<TxHandle, ChainError>>,
    receipts: VecDeque<Result<Receipt, ChainError>>,
    liquidate_calls: Vec<Address>,
    check_calls: Vec<Vec<Address>>,
    /// Trader a given submitted tx belongs to, recorded by `liquidate` so
    /// `await_receipt` can tell which trader a confirmed receipt closes
    /// out, without the caller needing to script that correlation.
    tx_trader: HashMap<TxHash, Address>,
    /// Traders with a confirmed, successful liquidation receipt.
    /// `is_liquidatable` forces `false` for these regardless of the
    /// scripted response, so a background recheck loop converges instead
    /// of resubmitting the same trader every cycle.
    liquidated: HashSet<Address>
}

/// Scripted [`crate::ChainGateway`] for tests: every call pops the next
/// queued response for that method, following the script exactly until
/// only one entry is left, at which point that last entry repeats
/// indefinitely — so a background polling loop (the Checker's recheck
/// cadence, the Tracker's forward scan) never runs the script dry just by
/// ticking more times than the test cared to script for. A method called
/// with nothing ever scripted for it panics.
#[derive(Clone, Default)]
pub struct MockChainGateway {
    state: std::sync::Arc<Mutex<MockState>>
}

fn pop_sticky<T: Clone>(queue: &mut VecDeque<T>, what: &str) -> T {
    if queue.len() > 1 {
        queue.pop_front().expect("checked non-empty above")
    } else {
        queue.front().cloned().unwrap_or_else(|| panic!("no scripted {what} response was ever provided"))
    }
}

impl MockChainGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_current_block(&self, block: u64) {
        self.state.lock().current_block = block;
    }

    pub fn push_position_events(&self, events: Vec<PositionChange>) {
        self.state.lock().position_events.push_back(Ok(events));
    }

    pub fn push_fetch_error(&self, err: ChainError) {
        self.state.lock().position_events.push_back(Err(err));
    }

    pub fn push_liquidatable(&self, flags: Vec<bool>) {
        self.state.lock().liquidatable.push_back(Ok(flags));
    }

    pub fn push_check_error(&self, err: ChainError) {
        self.state.lock().liquidatable.push_back(Err(err));
    }

    pub fn push_liquidate_ok(&self, tx_hash: TxHash) {
        self.state.lock().liquidate.push_back(Ok(TxHandle { tx_hash }));
    }

    pub fn push_liquidate_error(&self, err: ChainError) {
        self.state.lock().liquidate.push_back(Err(err));
    }

    pub fn push_receipt(&self, tx_hash: TxHash, status: bool) {
        self.state.lock().receipts.push_back(Ok(Receipt { tx_hash, status }));
    }

    pub fn push_receipt_error(&self, err: ChainError) {
        self.state.lock().receipts.push_back(Err(err));
    }

    /// Traders passed to `liquidate`, in call order.
    pub fn liquidate_calls(&self) -> Vec<Address> {
        self.state.lock().liquidate_calls.clone()
    }

    /// Batches passed to `is_liquidatable`, in call order.
    pub fn check_calls(&self) -> Vec<Vec<Address>> {
        self.state.lock().check_calls.clone()
    }
}

#[async_trait]
impl crate::ChainGateway for MockChainGateway {
    async fn current_block(&self) -> Result<u64, ChainError> {
        Ok(self.state.lock().current_block)
    }

    async fn fetch_position_events(&self, _from: u64, _to: u64) -> Result<Vec<PositionChange>, ChainError> {
        pop_sticky(&mut self.state.lock().position_events, "fetch_position_events")
    }

    async fn is_liquidatable(&self, batch: &[Address]) -> Result<Vec<bool>, ChainError> {
        let mut state = self.state.lock();
        state.check_calls.push(batch.to_vec());
        let mut flags = pop_sticky(&mut state.liquidatable, "is_liquidatable")?;
        for (flag, trader) in flags.iter_mut().zip(batch) {
            if state.liquidated.contains(trader) {
                *flag = false;
            }
        }
        Ok(flags)
    }

    async fn liquidate(&self, trader: Address) -> Result<TxHandle, ChainError> {
        let mut state = self.state.lock();
        state.liquidate_calls.push(trader);
        let handle = pop_sticky(&mut state.liquidate, "liquidate")?;
        state.tx_trader.insert(handle.tx_hash, trader);
        Ok(handle)
    }

    async fn await_receipt(&self, handle: TxHandle) -> Result<Receipt, ChainError> {
        let mut state = self.state.lock();
        let receipt = pop_sticky(&mut state.receipts, "await_receipt")?;
        if receipt.status {
            if let Some(trader) = state.tx_trader.get(&handle.tx_hash).copied() {
                state.liquidated.insert(trader);
            }
        }
        Ok(receipt)
    }
}
