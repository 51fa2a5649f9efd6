// JSON file repository implementation
use crate::application::observation_repository::ObservationRepository;
use crate::domain::event::Event;
use crate::domain::observable::Observable;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Stores observables and the event log as two pretty-printed JSON files
/// under the configured data directory. Individually invalid entries are
/// skipped with a warning rather than failing the whole load, so one bad
/// record cannot take the stored history hostage.
#[derive(Debug, Clone)]
pub struct JsonRepository {
    observables_path: PathBuf,
    events_path: PathBuf,
}

impl JsonRepository {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            observables_path: data_dir.join("observables.json"),
            events_path: data_dir.join("events.json"),
        }
    }

    async fn load_entries<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        let raw = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).context(format!("Failed to read {}", path.display()));
            }
        };

        let entries: Vec<serde_json::Value> = serde_json::from_slice(&raw)
            .context(format!("Failed to parse {}", path.display()))?;

        let mut parsed = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value(entry.clone()) {
                Ok(item) => parsed.push(item),
                Err(e) => {
                    tracing::warn!(%entry, error = %e, "skipping invalid entry in storage");
                }
            }
        }
        Ok(parsed)
    }

    async fn save_entries<T: Serialize>(&self, path: &Path, entries: &[T]) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create {}", parent.display()))?;
        }

        let data = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(path, data)
            .await
            .context(format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl ObservationRepository for JsonRepository {
    async fn load_observables(&self) -> Result<Vec<Observable>> {
        self.load_entries(&self.observables_path).await
    }

    async fn save_observables(&self, observables: &[Observable]) -> Result<()> {
        self.save_entries(&self.observables_path, observables).await
    }

    async fn load_events(&self) -> Result<Vec<Event>> {
        self.load_entries(&self.events_path).await
    }

    async fn save_events(&self, events: &[Event]) -> Result<()> {
        self.save_entries(&self.events_path, events).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{Property, Record};
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repository = JsonRepository::new(dir.path());

        let observables = vec![Observable::new("reactor", "./reactor.json")];
        repository.save_observables(&observables).await.unwrap();
        assert_eq!(repository.load_observables().await.unwrap(), observables);

        let events = vec![Event::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            vec![Record::new(
                "reactor",
                vec![
                    Property::new("temp", 21.5),
                    Property::new("status", "nominal"),
                ],
            )],
        )];
        repository.save_events(&events).await.unwrap();
        assert_eq!(repository.load_events().await.unwrap(), events);
    }

    #[tokio::test]
    async fn test_missing_files_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repository = JsonRepository::new(dir.path());
        assert!(repository.load_observables().await.unwrap().is_empty());
        assert!(repository.load_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let repository = JsonRepository::new(dir.path());

        let raw = r#"[
            {"name": "reactor", "source": "./reactor.json"},
            {"name": "broken"}
        ]"#;
        tokio::fs::write(dir.path().join("observables.json"), raw)
            .await
            .unwrap();

        let observables = repository.load_observables().await.unwrap();
        assert_eq!(observables, vec![Observable::new("reactor", "./reactor.json")]);
    }
}
