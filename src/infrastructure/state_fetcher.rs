// State fetcher - reads an observable's current state from its source
use crate::application::state_source::StateSource;
use crate::domain::event::Property;
use crate::domain::observable::{Observable, SourceKind};
use crate::domain::value::Value;
use async_trait::async_trait;
use std::time::Duration;

/// Fetches observable state from an HTTP(S) URL or a local JSON file.
///
/// Accepted payloads are either a JSON object (`{"temp": 21.5}`) or a list
/// of `{"name": ..., "value": ...}` entries. Failures of any kind are
/// logged and yield an empty property list; a capture never aborts because
/// one source is down.
#[derive(Debug, Clone)]
pub struct StateFetcher {
    client: reqwest::Client,
}

impl StateFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    async fn read_source(&self, observable: &Observable) -> anyhow::Result<serde_json::Value> {
        match observable.source_kind() {
            SourceKind::Url => {
                let response = self.client.get(&observable.source).send().await?;
                Ok(response.error_for_status()?.json().await?)
            }
            SourceKind::File => {
                let raw = tokio::fs::read(&observable.source).await?;
                Ok(serde_json::from_slice(&raw)?)
            }
        }
    }
}

impl Default for StateFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateSource for StateFetcher {
    async fn fetch_state(&self, observable: &Observable) -> Vec<Property> {
        match self.read_source(observable).await {
            Ok(raw) => parse_properties(raw),
            Err(e) => {
                tracing::warn!(
                    observable = %observable.name,
                    source = %observable.source,
                    error = %e,
                    "failed to fetch state; recording empty state"
                );
                Vec::new()
            }
        }
    }
}

fn scalar_value(raw: &serde_json::Value) -> Option<Value> {
    match raw {
        serde_json::Value::Number(n) => n.as_f64().map(Value::number),
        serde_json::Value::String(s) => Some(Value::text(s.clone())),
        _ => None,
    }
}

fn parse_properties(raw: serde_json::Value) -> Vec<Property> {
    match raw {
        serde_json::Value::Object(fields) => fields
            .into_iter()
            .filter_map(|(name, value)| {
                let value = scalar_value(&value)?;
                Some(Property { name, value })
            })
            .collect(),
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| {
                let name = item.get("name")?.as_str()?.to_string();
                let value = scalar_value(item.get("value")?)?;
                Some(Property { name, value })
            })
            .collect(),
        _ => Vec::new(),
    }
}
