// Observation model - objects and variables rebuilt from the event log
use super::event::Event;
use super::value::Value;
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};

/// Timestamp-keyed values of a single variable.
///
/// Iteration follows insertion order, not chronological order; callers that
/// need a time-sorted view must sort explicitly. Writing an existing
/// timestamp replaces its value in place (last write wins) and keeps the
/// original insertion position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueStore {
    values: IndexMap<DateTime<Utc>, Value>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, timestamp: DateTime<Utc>, value: Value) {
        self.values.insert(timestamp, value);
    }

    pub fn get(&self, timestamp: &DateTime<Utc>) -> Option<&Value> {
        self.values.get(timestamp)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateTime<Utc>, &Value)> {
        self.values.iter()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = &DateTime<Utc>> {
        self.values.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }

    /// All distinct values, first occurrence first, ignoring timestamps.
    pub fn distinct_values(&self) -> Vec<Value> {
        let unique: IndexSet<&Value> = self.values.values().collect();
        unique.into_iter().cloned().collect()
    }
}

/// A named variable and its time series.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub data: ValueStore,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: ValueStore::new(),
        }
    }
}

/// A derived object: one per observable seen in the event log, holding one
/// variable per distinct property name.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub name: String,
    pub variables: IndexMap<String, Variable>,
}

impl Object {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: IndexMap::new(),
        }
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }
}

/// The queryable object graph, rebuilt in full from an ordered event log.
///
/// A `Model` is a pure function of the event sequence and its order. It is
/// immutable after construction; new events require a rebuild.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub objects: Vec<Object>,
}

impl Model {
    /// Fold an ordered event sequence into the object graph.
    ///
    /// Objects appear in first-seen observable order and variables in
    /// first-seen property order. A later event writing the same timestamp
    /// for the same variable overwrites the earlier value, regardless of
    /// which timestamp is chronologically later.
    pub fn from_events(events: &[Event]) -> Self {
        let mut objects: IndexMap<String, Object> = IndexMap::new();

        for event in events {
            for record in &event.records {
                let object = objects
                    .entry(record.observable.clone())
                    .or_insert_with(|| Object::new(record.observable.clone()));

                for property in &record.state {
                    let variable = object
                        .variables
                        .entry(property.name.clone())
                        .or_insert_with(|| Variable::new(property.name.clone()));
                    variable.data.insert(event.timestamp, property.value.clone());
                }
            }
        }

        Self {
            objects: objects.into_values().collect(),
        }
    }

    pub fn object(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|object| object.name == name)
    }
}
