// Descriptive statistics over a variable within a domain
use super::domains::Domain;
use super::model::Variable;
use super::value::Value;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Descriptive statistics for one variable, filtered by a domain.
///
/// Which fields are populated depends on the domain variant that produced
/// them: numeric aggregates for ranges, a frequency table for enumerations.
/// Absent fields are omitted from the serialized form.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Stats {
    pub events: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_frequencies"
    )]
    pub frequencies: Option<IndexMap<Value, u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Value>,
}

impl Stats {
    pub fn empty() -> Self {
        Self::default()
    }
}

// JSON object keys must be strings, so numeric frequency keys are rendered
// through their display form. Insertion order is preserved.
fn serialize_frequencies<S>(
    frequencies: &Option<IndexMap<Value, u64>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match frequencies {
        Some(table) => {
            let mut map = serializer.serialize_map(Some(table.len()))?;
            for (value, count) in table {
                map.serialize_entry(&value.to_string(), count)?;
            }
            map.end()
        }
        None => serializer.serialize_none(),
    }
}

/// Accumulate an insertion-ordered frequency table.
pub(crate) fn frequency_table<'a, I>(values: I) -> IndexMap<Value, u64>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut table: IndexMap<Value, u64> = IndexMap::new();
    for value in values {
        *table.entry(value.clone()).or_insert(0) += 1;
    }
    table
}

// First maximal frequency wins; a later key must be strictly more frequent
// to displace the current mode.
fn mode_of(table: &IndexMap<Value, u64>) -> Option<Value> {
    let mut best: Option<(&Value, u64)> = None;
    for (value, &count) in table {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value.clone())
}

pub struct StatsAnalyzer;

impl StatsAnalyzer {
    /// Compute statistics for the values of `variable` that belong to
    /// `domain`. An empty filtered set yields `events = 0` with every other
    /// field absent; that is a result, not an error.
    pub fn compute(variable: &Variable, domain: &Domain) -> Stats {
        let values: Vec<&Value> = variable
            .data
            .values()
            .filter(|value| domain.contains(value))
            .collect();

        if values.is_empty() {
            return Stats::empty();
        }

        match domain {
            Domain::Range { .. } => Self::numeric_stats(&values),
            Domain::Enumeration { .. } => Self::frequency_stats(&values),
        }
    }

    fn numeric_stats(values: &[&Value]) -> Stats {
        let mut numeric: Vec<f64> = values.iter().filter_map(|v| v.as_number()).collect();

        // Mode is taken over the full filtered set, not just the numeric
        // survivors, and keeps the first-maximal tie-break.
        let table = frequency_table(values.iter().copied());
        let mode = mode_of(&table);

        if numeric.is_empty() {
            return Stats {
                events: 0,
                mode,
                ..Stats::empty()
            };
        }

        let n = numeric.len();
        let mean = numeric.iter().sum::<f64>() / n as f64;

        numeric.sort_by(|a, b| a.total_cmp(b));
        let median = if n % 2 == 1 {
            numeric[n / 2]
        } else {
            (numeric[n / 2 - 1] + numeric[n / 2]) / 2.0
        };

        // Sample standard deviation; a single observation has no spread.
        let std = if n > 1 {
            let variance = numeric
                .iter()
                .map(|v| (v - mean).powi(2))
                .sum::<f64>()
                / (n - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        Stats {
            events: n,
            mean: Some(mean),
            median: Some(median),
            std: Some(std),
            min: numeric.first().copied(),
            max: numeric.last().copied(),
            mode,
            ..Stats::empty()
        }
    }

    fn frequency_stats(values: &[&Value]) -> Stats {
        let table = frequency_table(values.iter().copied());
        let mode = mode_of(&table);

        Stats {
            events: values.len(),
            frequencies: Some(table),
            mode,
            ..Stats::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap()
    }

    fn variable_of(values: Vec<Value>) -> Variable {
        let mut variable = Variable::new("reading");
        for (i, value) in values.into_iter().enumerate() {
            variable.data.insert(ts(i as u32), value);
        }
        variable
    }

    #[test]
    fn test_empty_domain_yields_zero_events() {
        let variable = variable_of(vec![Value::number(500.0), Value::text("off")]);
        let stats = StatsAnalyzer::compute(&variable, &Domain::range(0.0, 100.0));
        assert_eq!(stats, Stats::empty());
    }

    #[test]
    fn test_range_aggregates() {
        let variable = variable_of(vec![
            Value::number(10.0),
            Value::number(20.0),
            Value::number(30.0),
        ]);
        let stats = StatsAnalyzer::compute(&variable, &Domain::range(0.0, 100.0));

        assert_eq!(stats.events, 3);
        assert_eq!(stats.mean, Some(20.0));
        assert_eq!(stats.median, Some(20.0));
        assert!((stats.std.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(stats.min, Some(10.0));
        assert_eq!(stats.max, Some(30.0));
        assert!(stats.frequencies.is_none());
    }

    #[test]
    fn test_even_count_median_averages_middle_pair() {
        let variable = variable_of(vec![
            Value::number(1.0),
            Value::number(2.0),
            Value::number(3.0),
            Value::number(4.0),
        ]);
        let stats = StatsAnalyzer::compute(&variable, &Domain::range(0.0, 10.0));
        assert_eq!(stats.median, Some(2.5));
    }

    #[test]
    fn test_single_value_has_zero_std() {
        let variable = variable_of(vec![Value::number(7.0)]);
        let stats = StatsAnalyzer::compute(&variable, &Domain::range(0.0, 10.0));
        assert_eq!(stats.events, 1);
        assert_eq!(stats.std, Some(0.0));
    }

    #[test]
    fn test_enumeration_frequencies_and_mode() {
        let variable = variable_of(vec![
            Value::text("ok"),
            Value::text("ok"),
            Value::text("warn"),
        ]);
        let domain = Domain::enumeration(vec![Value::text("ok"), Value::text("warn")]);
        let stats = StatsAnalyzer::compute(&variable, &domain);

        assert_eq!(stats.events, 3);
        let frequencies = stats.frequencies.unwrap();
        assert_eq!(frequencies.get(&Value::text("ok")), Some(&2));
        assert_eq!(frequencies.get(&Value::text("warn")), Some(&1));
        assert_eq!(stats.mode, Some(Value::text("ok")));
        assert!(stats.mean.is_none());
        assert!(stats.median.is_none());
        assert!(stats.std.is_none());
    }

    #[test]
    fn test_enumeration_counts_only_members() {
        let variable = variable_of(vec![
            Value::text("ok"),
            Value::text("unknown"),
            Value::text("warn"),
        ]);
        let domain = Domain::enumeration(vec![Value::text("ok"), Value::text("warn")]);
        let stats = StatsAnalyzer::compute(&variable, &domain);
        assert_eq!(stats.events, 2);
    }

    #[test]
    fn test_mode_tie_breaks_on_first_encountered() {
        let variable = variable_of(vec![
            Value::text("warn"),
            Value::text("ok"),
            Value::text("ok"),
            Value::text("warn"),
        ]);
        let domain = Domain::enumeration(vec![Value::text("ok"), Value::text("warn")]);
        let stats = StatsAnalyzer::compute(&variable, &domain);
        // Both counts are 2; "warn" was accumulated first.
        assert_eq!(stats.mode, Some(Value::text("warn")));
    }

    #[test]
    fn test_stats_serializes_without_absent_fields() {
        let variable = variable_of(vec![Value::text("ok")]);
        let domain = Domain::enumeration(vec![Value::text("ok")]);
        let stats = StatsAnalyzer::compute(&variable, &domain);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["events"], 1);
        assert_eq!(json["frequencies"]["ok"], 1);
        assert!(json.get("mean").is_none());
    }
}
