// Time-series extrapolation via least-squares polynomial fitting
use super::error::DomainError;
use super::model::Variable;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;

pub const DEFAULT_STEP_SECONDS: i64 = 86_400;

/// Forecast values keyed by sample timestamp, in sampling order.
pub type ForecastSeries = IndexMap<DateTime<Utc>, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastMethod {
    Linear,
    Quadratic,
}

impl ForecastMethod {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw {
            "linear" => Ok(ForecastMethod::Linear),
            "quadratic" => Ok(ForecastMethod::Quadratic),
            other => Err(DomainError::UnknownExtrapolationMethod(other.to_string())),
        }
    }
}

// Fitted polynomial over epoch seconds, centered at `origin` to keep the
// normal equations well conditioned for timestamps far from 1970.
#[derive(Debug, Clone, Copy)]
struct Polynomial {
    coefficients: [f64; 3],
    origin: f64,
}

impl Polynomial {
    fn evaluate(&self, epoch: f64) -> f64 {
        let x = epoch - self.origin;
        self.coefficients[0] + self.coefficients[1] * x + self.coefficients[2] * x * x
    }
}

pub struct Extrapolator;

impl Extrapolator {
    /// Fit a polynomial to a variable's numeric time series and sample it
    /// across the requested window.
    ///
    /// `x_min`/`x_max` default to the observed extremes. An equal or
    /// inverted window is forced to span exactly one step. Sample points
    /// start at `x_min` and advance by `step_seconds`; the right edge is
    /// always emitted even when the stepping does not land on it. A series
    /// with no numeric observations yields an empty result.
    pub fn extrapolate(
        variable: &Variable,
        x_min: Option<DateTime<Utc>>,
        x_max: Option<DateTime<Utc>>,
        step_seconds: i64,
        method: ForecastMethod,
    ) -> ForecastSeries {
        let observed: Vec<(f64, f64)> = variable
            .data
            .iter()
            .filter_map(|(ts, value)| {
                value
                    .as_number()
                    .map(|n| (ts.timestamp_millis() as f64 / 1000.0, n))
            })
            .collect();

        if observed.is_empty() {
            return ForecastSeries::new();
        }

        let observed_min = variable.data.timestamps().min().copied();
        let observed_max = variable.data.timestamps().max().copied();
        let x_min = match x_min.or(observed_min) {
            Some(ts) => ts,
            None => return ForecastSeries::new(),
        };
        let mut x_max = match x_max.or(observed_max) {
            Some(ts) => ts,
            None => return ForecastSeries::new(),
        };

        let step = Duration::seconds(step_seconds.max(1));
        if x_max <= x_min {
            x_max = x_min + step;
        }

        let polynomial = match method {
            ForecastMethod::Linear => fit_linear(&observed),
            ForecastMethod::Quadratic => fit_quadratic(&observed),
        };

        let mut series = ForecastSeries::new();
        let mut point = x_min;
        while point <= x_max {
            let epoch = point.timestamp_millis() as f64 / 1000.0;
            series.insert(point, polynomial.evaluate(epoch));
            point += step;
        }
        if !series.contains_key(&x_max) {
            let epoch = x_max.timestamp_millis() as f64 / 1000.0;
            series.insert(x_max, polynomial.evaluate(epoch));
        }

        series
    }
}

fn mean(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    values.sum::<f64>() / n as f64
}

fn fit_linear(observed: &[(f64, f64)]) -> Polynomial {
    let n = observed.len();
    let origin = mean(observed.iter().map(|(x, _)| *x), n);
    let y_mean = mean(observed.iter().map(|(_, y)| *y), n);

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in observed {
        let dx = x - origin;
        sxx += dx * dx;
        sxy += dx * (y - y_mean);
    }

    // All observations at one instant: degenerate to the constant mean.
    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    Polynomial {
        coefficients: [y_mean, slope, 0.0],
        origin,
    }
}

fn fit_quadratic(observed: &[(f64, f64)]) -> Polynomial {
    // Fewer than three distinct instants cannot pin down a parabola.
    let mut distinct: Vec<f64> = Vec::with_capacity(3);
    for (x, _) in observed {
        if !distinct.contains(x) {
            distinct.push(*x);
            if distinct.len() == 3 {
                break;
            }
        }
    }
    if distinct.len() < 3 {
        return fit_linear(observed);
    }

    let n = observed.len();
    let origin = mean(observed.iter().map(|(x, _)| *x), n);

    // Normal equations for degree 2 on centered x.
    let mut sx = [0.0f64; 5];
    let mut sy = [0.0f64; 3];
    for (x, y) in observed {
        let dx = x - origin;
        let mut power = 1.0;
        for (i, slot) in sx.iter_mut().enumerate() {
            *slot += power;
            if i < 3 {
                sy[i] += power * y;
            }
            power *= dx;
        }
    }

    let matrix = [
        [sx[0], sx[1], sx[2]],
        [sx[1], sx[2], sx[3]],
        [sx[2], sx[3], sx[4]],
    ];

    match solve_3x3(matrix, sy) {
        Some(coefficients) => Polynomial {
            coefficients,
            origin,
        },
        None => fit_linear(observed),
    }
}

// Gaussian elimination with partial pivoting; None when singular.
fn solve_3x3(mut a: [[f64; 3]; 3], mut b: [f64; 3]) -> Option<[f64; 3]> {
    let scale = a
        .iter()
        .flatten()
        .fold(0.0f64, |acc, v| acc.max(v.abs()))
        .max(1.0);

    for col in 0..3 {
        let pivot_row = (col..3)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot_row][col].abs() < scale * 1e-12 {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..3 {
            let factor = a[row][col] / a[col][col];
            for k in col..3 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0f64; 3];
    for row in (0..3).rev() {
        let mut sum = b[row];
        for k in (row + 1)..3 {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value::Value;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
    }

    fn day(n: i64) -> DateTime<Utc> {
        t0() + Duration::days(n)
    }

    fn variable_of(points: Vec<(DateTime<Utc>, f64)>) -> Variable {
        let mut variable = Variable::new("level");
        for (ts, value) in points {
            variable.data.insert(ts, Value::number(value));
        }
        variable
    }

    #[test]
    fn test_parse_rejects_unknown_method() {
        assert_eq!(ForecastMethod::parse("linear"), Ok(ForecastMethod::Linear));
        assert_eq!(
            ForecastMethod::parse("quadratic"),
            Ok(ForecastMethod::Quadratic)
        );
        assert_eq!(
            ForecastMethod::parse("cubic"),
            Err(DomainError::UnknownExtrapolationMethod("cubic".to_string()))
        );
    }

    #[test]
    fn test_linear_extends_past_observed_window() {
        let variable = variable_of(vec![(t0(), 0.0), (day(1), 10.0)]);
        let series = Extrapolator::extrapolate(
            &variable,
            Some(t0()),
            Some(day(2)),
            DEFAULT_STEP_SECONDS,
            ForecastMethod::Linear,
        );

        let keys: Vec<DateTime<Utc>> = series.keys().copied().collect();
        assert_eq!(keys, vec![t0(), day(1), day(2)]);
        assert!((series[&t0()] - 0.0).abs() < 1e-6);
        assert!((series[&day(1)] - 10.0).abs() < 1e-6);
        assert!((series[&day(2)] - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_window_defaults_to_observed_extremes() {
        let variable = variable_of(vec![(t0(), 5.0), (day(2), 15.0)]);
        let series = Extrapolator::extrapolate(
            &variable,
            None,
            None,
            DEFAULT_STEP_SECONDS,
            ForecastMethod::Linear,
        );
        let keys: Vec<DateTime<Utc>> = series.keys().copied().collect();
        assert_eq!(keys, vec![t0(), day(1), day(2)]);
    }

    #[test]
    fn test_inverted_window_spans_one_step() {
        let variable = variable_of(vec![(t0(), 5.0), (day(1), 6.0)]);
        let series = Extrapolator::extrapolate(
            &variable,
            Some(day(3)),
            Some(day(1)),
            DEFAULT_STEP_SECONDS,
            ForecastMethod::Linear,
        );
        let keys: Vec<DateTime<Utc>> = series.keys().copied().collect();
        assert_eq!(keys, vec![day(3), day(4)]);
    }

    #[test]
    fn test_right_edge_is_always_emitted() {
        let variable = variable_of(vec![(t0(), 0.0), (day(1), 10.0)]);
        let half_day = day(1) + Duration::hours(12);
        let series = Extrapolator::extrapolate(
            &variable,
            Some(t0()),
            Some(half_day),
            DEFAULT_STEP_SECONDS,
            ForecastMethod::Linear,
        );
        let keys: Vec<DateTime<Utc>> = series.keys().copied().collect();
        assert_eq!(keys, vec![t0(), day(1), half_day]);
        assert!((series[&half_day] - 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_series_yields_empty_forecast() {
        let variable = Variable::new("level");
        let series = Extrapolator::extrapolate(
            &variable,
            None,
            None,
            DEFAULT_STEP_SECONDS,
            ForecastMethod::Linear,
        );
        assert!(series.is_empty());
    }

    #[test]
    fn test_quadratic_recovers_a_parabola() {
        // value = (days since t0)^2, sampled at 0..4 days.
        let variable = variable_of((0..5).map(|d| (day(d), (d * d) as f64)).collect());
        let series = Extrapolator::extrapolate(
            &variable,
            Some(t0()),
            Some(day(6)),
            DEFAULT_STEP_SECONDS,
            ForecastMethod::Quadratic,
        );
        assert!((series[&day(6)] - 36.0).abs() < 1e-3);
    }

    #[test]
    fn test_quadratic_falls_back_to_linear_when_underdetermined() {
        let variable = variable_of(vec![(t0(), 0.0), (day(1), 10.0)]);
        let series = Extrapolator::extrapolate(
            &variable,
            Some(t0()),
            Some(day(2)),
            DEFAULT_STEP_SECONDS,
            ForecastMethod::Quadratic,
        );
        assert!((series[&day(2)] - 20.0).abs() < 1e-6);
    }
}
