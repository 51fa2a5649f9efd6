// Application state for HTTP handlers
use crate::application::observation_service::ObservationService;

pub struct AppState {
    pub observations: ObservationService,
}
