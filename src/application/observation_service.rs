// Observation service - use cases over the rebuilt model
use crate::application::observation_repository::ObservationRepository;
use crate::application::state_source::StateSource;
use crate::domain::domains::Domain;
use crate::domain::error::DomainError;
use crate::domain::event::{Event, Record};
use crate::domain::forecast::{Extrapolator, ForecastMethod, ForecastSeries};
use crate::domain::model::{Model, Variable};
use crate::domain::observable::Observable;
use crate::domain::plot::{PlotData, PlotDataBuilder, PlotType};
use crate::domain::stats::{Stats, StatsAnalyzer};
use crate::domain::value::Value;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

struct ServiceState {
    observables: Vec<Observable>,
    events: Vec<Event>,
    model: Model,
}

/// Orchestrates captures and queries over the observation model.
///
/// The model is an immutable snapshot of the persisted event log; capturing
/// a new event appends to the log, persists it and rebuilds the model in
/// full. Queries only take the read half of the lock.
pub struct ObservationService {
    repository: Arc<dyn ObservationRepository>,
    state_source: Arc<dyn StateSource>,
    state: RwLock<ServiceState>,
}

impl ObservationService {
    pub async fn load(
        repository: Arc<dyn ObservationRepository>,
        state_source: Arc<dyn StateSource>,
    ) -> anyhow::Result<Self> {
        let observables = repository
            .load_observables()
            .await
            .context("Failed to load observables")?;
        let events = repository
            .load_events()
            .await
            .context("Failed to load events")?;
        let model = Model::from_events(&events);

        tracing::info!(
            observables = observables.len(),
            events = events.len(),
            objects = model.objects.len(),
            "observation model loaded"
        );

        Ok(Self {
            repository,
            state_source,
            state: RwLock::new(ServiceState {
                observables,
                events,
                model,
            }),
        })
    }

    pub async fn new_observable(
        &self,
        name: String,
        source: String,
    ) -> anyhow::Result<Observable> {
        let observable = Observable::new(name, source);
        let mut state = self.state.write().await;
        state.observables.push(observable.clone());
        self.repository
            .save_observables(&state.observables)
            .await
            .context("Failed to save observables")?;
        Ok(observable)
    }

    /// Fetch the current state of every registered observable, append one
    /// event for the capture, persist the log and rebuild the model.
    pub async fn capture_event(&self) -> anyhow::Result<Event> {
        let mut state = self.state.write().await;

        let timestamp = Utc::now();
        let mut records = Vec::with_capacity(state.observables.len());
        for observable in &state.observables {
            let properties = self.state_source.fetch_state(observable).await;
            records.push(Record::new(observable.name.clone(), properties));
        }

        let event = Event::new(timestamp, records);
        state.events.push(event.clone());
        self.repository
            .save_events(&state.events)
            .await
            .context("Failed to save events")?;
        state.model = Model::from_events(&state.events);

        tracing::info!(%timestamp, records = event.records.len(), "event captured");
        Ok(event)
    }

    pub async fn list_observables(&self) -> Vec<Observable> {
        self.state.read().await.observables.clone()
    }

    pub async fn list_objects(&self) -> Vec<String> {
        let state = self.state.read().await;
        state
            .model
            .objects
            .iter()
            .map(|object| object.name.clone())
            .collect()
    }

    pub async fn list_variables(&self, object_name: &str) -> Result<Vec<String>, DomainError> {
        let state = self.state.read().await;
        let object = state
            .model
            .object(object_name)
            .ok_or_else(|| DomainError::UnknownObject(object_name.to_string()))?;
        Ok(object.variables.keys().cloned().collect())
    }

    pub async fn stats_within_range(
        &self,
        object_name: &str,
        variable_name: &str,
        min: f64,
        max: f64,
    ) -> Result<Stats, DomainError> {
        self.with_variable(object_name, variable_name, |variable| {
            StatsAnalyzer::compute(variable, &Domain::range(min, max))
        })
        .await
    }

    /// Statistics over every value the variable has ever taken, treated as
    /// an enumeration of its distinct values.
    pub async fn stats_for_values(
        &self,
        object_name: &str,
        variable_name: &str,
    ) -> Result<Stats, DomainError> {
        self.with_variable(object_name, variable_name, |variable| {
            let domain = Domain::enumeration(variable.data.distinct_values());
            StatsAnalyzer::compute(variable, &domain)
        })
        .await
    }

    pub async fn variable_data(
        &self,
        object_name: &str,
        variable_name: &str,
    ) -> Result<Vec<(DateTime<Utc>, Value)>, DomainError> {
        self.with_variable(object_name, variable_name, |variable| {
            variable
                .data
                .iter()
                .map(|(ts, value)| (*ts, value.clone()))
                .collect()
        })
        .await
    }

    pub async fn plot_data(
        &self,
        object_name: &str,
        variable_name: &str,
        plot_type: &str,
        y_resolution: u32,
    ) -> Result<PlotData, DomainError> {
        let plot_type = PlotType::parse(plot_type)?;
        self.with_variable(object_name, variable_name, |variable| {
            PlotDataBuilder::build(object_name, variable, plot_type, y_resolution)
        })
        .await
    }

    pub async fn forecast(
        &self,
        object_name: &str,
        variable_name: &str,
        method: &str,
        x_min: Option<DateTime<Utc>>,
        x_max: Option<DateTime<Utc>>,
        step_seconds: i64,
    ) -> Result<ForecastSeries, DomainError> {
        let method = ForecastMethod::parse(method)?;
        self.with_variable(object_name, variable_name, |variable| {
            Extrapolator::extrapolate(variable, x_min, x_max, step_seconds, method)
        })
        .await
    }

    async fn with_variable<T>(
        &self,
        object_name: &str,
        variable_name: &str,
        f: impl FnOnce(&Variable) -> T,
    ) -> Result<T, DomainError> {
        let state = self.state.read().await;
        let object = state
            .model
            .object(object_name)
            .ok_or_else(|| DomainError::UnknownObject(object_name.to_string()))?;
        let variable = object
            .variable(variable_name)
            .ok_or_else(|| DomainError::UnknownVariable {
                object: object_name.to_string(),
                variable: variable_name.to_string(),
            })?;
        Ok(f(variable))
    }
}
