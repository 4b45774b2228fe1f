//! Timing helper used to feed latency histograms (`liq-metrics`), mirroring
//! the teacher's `angstrom_utils::timer::async_time_fn` referenced from
//! `consensus/round_state.rs`.

use std::{future::Future, time::Duration};

use tokio::time::Instant;

/// Runs `f`, returning its output alongside how long it took to resolve.
pub async fn async_time_fn<F, Fut, T>(f: F) -> (T, Duration)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>
{
    let start = Instant::now();
    let out = f().await;
    (out, start.elapsed())
}
