// HTTP request handlers
use crate::domain::error::DomainError;
use crate::domain::forecast::DEFAULT_STEP_SECONDS;
use crate::domain::plot::DEFAULT_Y_RESOLUTION;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct CreateObservableRequest {
    pub name: String,
    pub source: String,
}

#[derive(Deserialize)]
pub struct StatsQuery {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Deserialize)]
pub struct PlotQuery {
    #[serde(rename = "type")]
    pub plot_type: String,
    pub resolution: Option<u32>,
}

#[derive(Deserialize)]
pub struct ForecastQuery {
    pub method: String,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub step: Option<i64>,
}

// Validation failures map to 400, failed lookups to 404.
fn domain_error_response(error: DomainError) -> Response {
    let status = match error {
        DomainError::UnsupportedPlotType(_) | DomainError::UnknownExtrapolationMethod(_) => {
            StatusCode::BAD_REQUEST
        }
        DomainError::UnknownObject(_) | DomainError::UnknownVariable { .. } => {
            StatusCode::NOT_FOUND
        }
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

fn internal_error_response(error: anyhow::Error) -> Response {
    tracing::error!(error = %error, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal error" })),
    )
        .into_response()
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_observables(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.observations.list_observables().await)
}

pub async fn create_observable(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateObservableRequest>,
) -> impl IntoResponse {
    match state
        .observations
        .new_observable(request.name, request.source)
        .await
    {
        Ok(observable) => (StatusCode::CREATED, Json(observable)).into_response(),
        Err(e) => internal_error_response(e),
    }
}

/// Capture the current state of every observable as one new event.
pub async fn capture_event(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.observations.capture_event().await {
        Ok(event) => (StatusCode::CREATED, Json(event)).into_response(),
        Err(e) => internal_error_response(e),
    }
}

pub async fn list_objects(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.observations.list_objects().await)
}

pub async fn list_variables(
    Path(object): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match state.observations.list_variables(&object).await {
        Ok(variables) => Json(variables).into_response(),
        Err(e) => domain_error_response(e),
    }
}

pub async fn get_variable_data(
    Path((object, variable)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match state.observations.variable_data(&object, &variable).await {
        Ok(data) => Json(data).into_response(),
        Err(e) => domain_error_response(e),
    }
}

/// Statistics for one variable. With both `min` and `max` query parameters
/// the values are filtered through a numeric range; otherwise the variable's
/// own distinct values form an enumeration domain.
pub async fn get_stats(
    Path((object, variable)): Path<(String, String)>,
    Query(query): Query<StatsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let result = match (query.min, query.max) {
        (Some(min), Some(max)) => {
            state
                .observations
                .stats_within_range(&object, &variable, min, max)
                .await
        }
        _ => state.observations.stats_for_values(&object, &variable).await,
    };

    match result {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => domain_error_response(e),
    }
}

pub async fn get_plot(
    Path((object, variable)): Path<(String, String)>,
    Query(query): Query<PlotQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let resolution = query.resolution.unwrap_or(DEFAULT_Y_RESOLUTION);
    match state
        .observations
        .plot_data(&object, &variable, &query.plot_type, resolution)
        .await
    {
        Ok(plot) => Json(plot).into_response(),
        Err(e) => domain_error_response(e),
    }
}

pub async fn get_forecast(
    Path((object, variable)): Path<(String, String)>,
    Query(query): Query<ForecastQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let step = query.step.unwrap_or(DEFAULT_STEP_SECONDS);
    match state
        .observations
        .forecast(&object, &variable, &query.method, query.from, query.to, step)
        .await
    {
        Ok(series) => Json(series).into_response(),
        Err(e) => domain_error_response(e),
    }
}
