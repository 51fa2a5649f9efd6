// Port for fetching an observable's current state
use crate::domain::event::Property;
use crate::domain::observable::Observable;
use async_trait::async_trait;

/// Fetches the current state of a sourced observable.
///
/// Implementations never fail: an unreachable or malformed source yields an
/// empty property list so a capture still produces a well-formed event.
#[async_trait]
pub trait StateSource: Send + Sync {
    async fn fetch_state(&self, observable: &Observable) -> Vec<Property>;
}
