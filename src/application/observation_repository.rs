// Repository trait for observable and event persistence
use crate::domain::event::Event;
use crate::domain::observable::Observable;
use async_trait::async_trait;

/// Persistence port for the registered observables and the append-only
/// event log. The engine never reads storage mid-computation; everything is
/// loaded up front and saved back in full.
#[async_trait]
pub trait ObservationRepository: Send + Sync {
    async fn load_observables(&self) -> anyhow::Result<Vec<Observable>>;

    async fn save_observables(&self, observables: &[Observable]) -> anyhow::Result<()>;

    async fn load_events(&self) -> anyhow::Result<Vec<Event>>;

    async fn save_events(&self, events: &[Event]) -> anyhow::Result<()>;
}
