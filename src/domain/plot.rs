// Plot-ready projections of a variable's time series
use super::domains::Domain;
use super::error::DomainError;
use super::model::Variable;
use super::stats::{Stats, StatsAnalyzer, frequency_table};
use super::value::Value;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Reverse;

pub const DEFAULT_Y_RESOLUTION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlotType {
    #[serde(rename = "time series")]
    TimeSeries,
    #[serde(rename = "distribution")]
    Distribution,
}

impl PlotType {
    /// Parse a requested plot type; anything unrecognized is rejected
    /// immediately rather than coerced to a default.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw {
            "time series" => Ok(PlotType::TimeSeries),
            "distribution" => Ok(PlotType::Distribution),
            other => Err(DomainError::UnsupportedPlotType(other.to_string())),
        }
    }
}

/// One coordinate on a plot axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisValue {
    Time(DateTime<Utc>),
    Data(Value),
    Count(u64),
}

/// Axes, labels and statistics for one variable, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotData {
    pub object_name: String,
    pub variable_name: String,
    pub plot_type: PlotType,
    pub x: Vec<AxisValue>,
    pub y: Vec<AxisValue>,
    pub title: String,
    pub subtitle: String,
    pub x_label: String,
    pub y_label: String,
    pub stats: Stats,
}

// Distribution axis ordering is a two-branch policy keyed on whether the
// bucket keys are mutually comparable, never on a failed comparison.
#[derive(Debug, PartialEq, Eq)]
enum KeyOrdering {
    AllNumeric,
    AllText,
    Mixed,
}

fn classify_keys<'a, I>(keys: I) -> KeyOrdering
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut saw_numeric = false;
    let mut saw_text = false;
    for key in keys {
        match key {
            Value::Number(_) => saw_numeric = true,
            Value::Text(_) => saw_text = true,
        }
    }
    match (saw_numeric, saw_text) {
        (true, true) => KeyOrdering::Mixed,
        (false, true) => KeyOrdering::AllText,
        _ => KeyOrdering::AllNumeric,
    }
}

// Truncate downward at the requested decimal resolution. Deliberately a
// floor, not round-to-nearest: 1.238 buckets to 1.23 at resolution 2.
fn truncate_at_resolution(value: f64, y_resolution: u32) -> f64 {
    let scale = 10f64.powi(y_resolution as i32);
    (value * scale).floor() / scale
}

pub struct PlotDataBuilder;

impl PlotDataBuilder {
    /// Derive plot axes and statistics for one variable.
    ///
    /// Statistics use a range domain spanning the numeric min/max when every
    /// value is numeric, otherwise an enumeration over the distinct values;
    /// the same decision feeds the distribution frequency axes. Calling this
    /// twice over an unchanged store yields identical output.
    pub fn build(
        object_name: &str,
        variable: &Variable,
        plot_type: PlotType,
        y_resolution: u32,
    ) -> PlotData {
        let stats = Self::compute_stats(variable);

        let (x, y, title, x_label, y_label) = match plot_type {
            PlotType::TimeSeries => Self::time_series_axes(variable),
            PlotType::Distribution => Self::distribution_axes(variable, y_resolution),
        };

        PlotData {
            object_name: object_name.to_string(),
            variable_name: variable.name.clone(),
            plot_type,
            x,
            y,
            title,
            subtitle: object_name.to_string(),
            x_label,
            y_label,
            stats,
        }
    }

    fn compute_stats(variable: &Variable) -> Stats {
        let values: Vec<&Value> = variable.data.values().collect();
        let all_numeric = !values.is_empty() && values.iter().all(|v| v.is_numeric());

        let domain = if all_numeric {
            let numeric: Vec<f64> = values.iter().filter_map(|v| v.as_number()).collect();
            let min = numeric.iter().copied().fold(f64::INFINITY, f64::min);
            let max = numeric.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Domain::range(min, max)
        } else {
            Domain::enumeration(variable.data.distinct_values())
        };

        StatsAnalyzer::compute(variable, &domain)
    }

    #[allow(clippy::type_complexity)]
    fn time_series_axes(
        variable: &Variable,
    ) -> (Vec<AxisValue>, Vec<AxisValue>, String, String, String) {
        // x and y stay positionally paired in the store's iteration order.
        let x = variable
            .data
            .timestamps()
            .map(|ts| AxisValue::Time(*ts))
            .collect();
        let y = variable
            .data
            .values()
            .map(|value| AxisValue::Data(value.clone()))
            .collect();

        (
            x,
            y,
            format!("Time Series for {}", variable.name),
            "Time".to_string(),
            variable.name.clone(),
        )
    }

    #[allow(clippy::type_complexity)]
    fn distribution_axes(
        variable: &Variable,
        y_resolution: u32,
    ) -> (Vec<AxisValue>, Vec<AxisValue>, String, String, String) {
        let buckets: Vec<Value> = variable
            .data
            .values()
            .map(|value| match value {
                Value::Number(n) => Value::number(truncate_at_resolution(n.0, y_resolution)),
                Value::Text(s) => Value::text(s.clone()),
            })
            .collect();

        let table = frequency_table(buckets.iter());
        let mut entries: Vec<(Value, u64)> = table.into_iter().collect();

        match classify_keys(entries.iter().map(|(key, _)| key)) {
            KeyOrdering::AllNumeric => entries.sort_by(|(a, _), (b, _)| {
                a.as_number()
                    .unwrap_or(f64::NAN)
                    .total_cmp(&b.as_number().unwrap_or(f64::NAN))
            }),
            KeyOrdering::AllText => entries.sort_by(|(a, _), (b, _)| {
                a.to_string().cmp(&b.to_string())
            }),
            KeyOrdering::Mixed => entries.sort_by(|(a, count_a), (b, count_b)| {
                (Reverse(*count_a), a.to_string()).cmp(&(Reverse(*count_b), b.to_string()))
            }),
        }

        let x = entries
            .iter()
            .map(|(key, _)| AxisValue::Data(key.clone()))
            .collect();
        let y = entries
            .iter()
            .map(|(_, count)| AxisValue::Count(*count))
            .collect();

        (
            x,
            y,
            format!("Distribution of {}", variable.name),
            variable.name.clone(),
            "Frequency".to_string(),
        )
    }
}
