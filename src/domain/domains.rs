// Value domains - membership predicates and random sampling
use super::value::Value;
use rand::Rng;
use rand::seq::SliceRandom;

/// The set of values a variable is allowed (or expected) to take.
///
/// A sum type so the statistics analyzer can dispatch by pattern matching;
/// adding a variant forces every consumer to decide how to treat it.
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    /// Numeric interval, inclusive at both ends. Non-numeric values never
    /// belong. Inverted bounds (`min > max`) are accepted as-is and simply
    /// match nothing; they are never silently swapped.
    Range { min: f64, max: f64 },
    /// Discrete set of admissible values, matched by exact equality.
    Enumeration { values: Vec<Value> },
}

impl Domain {
    pub fn range(min: f64, max: f64) -> Self {
        Domain::Range { min, max }
    }

    pub fn enumeration(values: Vec<Value>) -> Self {
        Domain::Enumeration { values }
    }

    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Domain::Range { min, max } => value
                .as_number()
                .is_some_and(|n| *min <= n && n <= *max),
            Domain::Enumeration { values } => values.contains(value),
        }
    }

    /// Draw `n` values from the domain.
    ///
    /// Range draws uniform reals in `[min, max]`; Enumeration draws
    /// uniformly with replacement. An empty enumeration yields nothing.
    pub fn random_sample(&self, n: usize) -> Vec<Value> {
        let mut rng = rand::thread_rng();
        match self {
            Domain::Range { min, max } => (0..n)
                .map(|_| Value::number(min + rng.r#gen::<f64>() * (max - min)))
                .collect(),
            Domain::Enumeration { values } => (0..n)
                .filter_map(|_| values.choose(&mut rng).cloned())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_membership_is_inclusive() {
        let domain = Domain::range(0.0, 100.0);
        assert!(domain.contains(&Value::number(0.0)));
        assert!(domain.contains(&Value::number(100.0)));
        assert!(domain.contains(&Value::number(50.0)));
        assert!(!domain.contains(&Value::number(-0.1)));
        assert!(!domain.contains(&Value::number(100.1)));
    }

    #[test]
    fn test_range_rejects_non_numeric() {
        let domain = Domain::range(0.0, 100.0);
        assert!(!domain.contains(&Value::text("50")));
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let domain = Domain::range(10.0, 0.0);
        assert!(!domain.contains(&Value::number(5.0)));
        assert!(!domain.contains(&Value::number(10.0)));
    }

    #[test]
    fn test_enumeration_membership() {
        let domain = Domain::enumeration(vec![Value::text("ok"), Value::number(1.0)]);
        assert!(domain.contains(&Value::text("ok")));
        assert!(domain.contains(&Value::number(1.0)));
        // No coercion between "1" and 1.0.
        assert!(!domain.contains(&Value::text("1")));
    }

    #[test]
    fn test_range_sample_stays_within_bounds() {
        let domain = Domain::range(-2.0, 3.0);
        let sample = domain.random_sample(100);
        assert_eq!(sample.len(), 100);
        for value in sample {
            let n = value.as_number().unwrap();
            assert!((-2.0..=3.0).contains(&n));
        }
    }

    #[test]
    fn test_enumeration_sample_draws_members() {
        let members = vec![Value::text("ok"), Value::text("warn")];
        let domain = Domain::enumeration(members.clone());
        let sample = domain.random_sample(50);
        assert_eq!(sample.len(), 50);
        assert!(sample.iter().all(|v| members.contains(v)));

        assert!(Domain::enumeration(vec![]).random_sample(5).is_empty());
    }
}
