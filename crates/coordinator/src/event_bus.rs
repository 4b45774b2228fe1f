//! Fans the event stream out to one [`Reporter`] instance, restarting it
//! on crash (spec.md §4.6). Delivery is best-effort: the bus never applies
//! backpressure to the pipeline — a full channel means the producer's
//! `try_send` silently drops the event, which is the pipeline side of the
//! same contract.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use liq_types::{BotEvent, ErrorKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::reporter::Reporter;

/// Drives `reporter` off `events` until `cancel` fires or a
/// [`BotEvent::BotStopped`] is observed. `make_reporter` is called again
/// whenever a `report` call panics, so a crashing reporter never takes the
/// rest of the pipeline down with it.
pub async fn run_event_bus<R: Reporter>(mut events: mpsc::Receiver<BotEvent>, mut make_reporter: impl FnMut() -> R, cancel: CancellationToken) {
    let mut reporter = make_reporter();

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            received = events.recv() => match received {
                Some(event) => event,
                None => break
            }
        };

        let is_terminal = matches!(event, BotEvent::BotStopped);

        if AssertUnwindSafe(reporter.report(event)).catch_unwind().await.is_err() {
            error!("reporter panicked, restarting it");
            reporter = make_reporter();
            reporter
                .report(BotEvent::Error { kind: ErrorKind::ReporterCrash, cause: "reporter panicked and was restarted".to_string() })
                .await;
        }

        if is_terminal {
            break
        }
    }
}
