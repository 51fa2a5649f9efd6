// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::application::observation_service::ObservationService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::json_repository::JsonRepository;
use crate::infrastructure::state_fetcher::StateFetcher;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    capture_event, create_observable, get_forecast, get_plot, get_stats, get_variable_data,
    health_check, list_objects, list_observables, list_variables,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_app_config()?;

    // Create adapters (infrastructure layer)
    let repository = Arc::new(JsonRepository::new(&config.storage.data_dir));
    let state_fetcher = Arc::new(StateFetcher::new());

    // Create service (application layer) - loads the persisted event log
    // and rebuilds the observation model
    let observations = ObservationService::load(repository, state_fetcher).await?;

    // Create application state
    let state = Arc::new(AppState { observations });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/observables", get(list_observables).post(create_observable))
        .route("/events", post(capture_event))
        .route("/objects", get(list_objects))
        .route("/objects/:object/variables", get(list_variables))
        .route(
            "/objects/:object/variables/:variable/data",
            get(get_variable_data),
        )
        .route("/objects/:object/variables/:variable/stats", get(get_stats))
        .route("/objects/:object/variables/:variable/plot", get(get_plot))
        .route(
            "/objects/:object/variables/:variable/forecast",
            get(get_forecast),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!(%addr, "starting observatory service");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
