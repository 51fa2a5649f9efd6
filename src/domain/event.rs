// Observation event domain models
use super::value::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One named value captured from an observable's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: Value,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The full state of one observable at a single capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub observable: String,
    pub state: Vec<Property>,
}

impl Record {
    pub fn new(observable: impl Into<String>, state: Vec<Property>) -> Self {
        Self {
            observable: observable.into(),
            state,
        }
    }
}

/// A timestamped capture of every observable's state.
///
/// Timestamps are normalized to UTC at deserialization time; offsets in the
/// stored RFC 3339 form are converted, never preserved. Events are immutable
/// once created and accumulate append-only in the persisted sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub records: Vec<Record>,
}

impl Event {
    pub fn new(timestamp: DateTime<Utc>, records: Vec<Record>) -> Self {
        Self { timestamp, records }
    }
}
