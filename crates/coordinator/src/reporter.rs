//! Reporter interface (spec.md §4.6): consumes the event stream. Concrete
//! implementations (`liq-reporting`'s console/metrics reporters) are
//! external collaborators behind this trait.

use async_trait::async_trait;
use liq_types::BotEvent;

#[async_trait]
pub trait Reporter: Send + 'static {
    async fn report(&mut self, event: BotEvent);
}
