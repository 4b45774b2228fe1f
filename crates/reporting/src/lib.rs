//! External-observability reporters (spec.md §4.6): adapters from the
//! coordinator's event bus to the console and to Prometheus.

pub mod console;
pub mod metrics;

pub use console::ConsoleReporter;
use liq_coordinator::Reporter as _;
use liq_types::BotEvent;
pub use metrics::MetricsReporter;

/// Picks between the two reporters spec.md §6's `reporting` config names.
/// `Coordinator::run` is generic over a single `Reporter` type, so
/// `main` needs one concrete type regardless of which mode was
/// configured; this enum is that type.
pub enum AnyReporter {
    Console(ConsoleReporter),
    Metrics(MetricsReporter)
}

#[async_trait::async_trait]
impl liq_coordinator::Reporter for AnyReporter {
    async fn report(&mut self, event: BotEvent) {
        match self {
            Self::Console(reporter) => reporter.report(event).await,
            Self::Metrics(reporter) => reporter.report(event).await
        }
    }
}
