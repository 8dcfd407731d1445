//! Statistical test selection for per-column drift detection.
//!
//! The detector only depends on the [`StatTestSuite`] trait, so the tests
//! used for numeric and categorical columns can be swapped without touching
//! the aggregator or the validator.

use super::report::StatTestOutcome;
use super::stats;
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Standard deviation floor used to normalise the Wasserstein distance.
const MIN_WASSERSTEIN_NORM: f64 = 0.001;

/// Thresholds each test's score is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatTestThresholds {
    /// Kolmogorov-Smirnov: drift when p-value is below this
    pub ks_p_value: f64,
    /// Chi-squared: drift when p-value is below this
    pub chi_square_p_value: f64,
    /// Normed Wasserstein: drift when distance is at least this
    pub wasserstein_distance: f64,
    /// Jensen-Shannon: drift when distance is at least this
    pub jensen_shannon_distance: f64,
}

impl Default for StatTestThresholds {
    fn default() -> Self {
        Self {
            ks_p_value: 0.05,
            chi_square_p_value: 0.05,
            wasserstein_distance: 0.1,
            jensen_shannon_distance: 0.1,
        }
    }
}

impl StatTestThresholds {
    /// Checks every threshold is a usable, finite value.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("ks_p_value", self.ks_p_value),
            ("chi_square_p_value", self.chi_square_p_value),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(DriftError::Configuration(format!(
                    "{name} must be in (0, 1), got {value}"
                )));
            }
        }
        for (name, value) in [
            ("wasserstein_distance", self.wasserstein_distance),
            ("jensen_shannon_distance", self.jensen_shannon_distance),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(DriftError::Configuration(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// A pair of drift tests: one for numeric columns, one for categorical.
///
/// Inputs never contain missing values and are never empty.
pub trait StatTestSuite: Send + Sync + Debug {
    /// Tests a numeric column pair.
    fn detect_numeric(&self, reference: &[f64], current: &[f64]) -> Result<StatTestOutcome>;

    /// Tests a categorical column pair.
    fn detect_categorical(
        &self,
        reference: &[String],
        current: &[String],
    ) -> Result<StatTestOutcome>;
}

/// Test selection that adapts to sample size and cardinality.
///
/// | reference rows         | numeric                               | categorical     |
/// |------------------------|---------------------------------------|-----------------|
/// | `<= large_sample_rows` | KS, or chi-squared if few unique values | chi-squared   |
/// | `> large_sample_rows`  | normed Wasserstein distance           | Jensen-Shannon  |
#[derive(Debug, Clone)]
pub struct DefaultStatTests {
    thresholds: StatTestThresholds,
    large_sample_rows: usize,
    low_cardinality_unique_values: usize,
}

impl Default for DefaultStatTests {
    fn default() -> Self {
        Self {
            thresholds: StatTestThresholds::default(),
            large_sample_rows: 1000,
            low_cardinality_unique_values: 5,
        }
    }
}

impl DefaultStatTests {
    pub fn new(thresholds: StatTestThresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    /// Reference row count above which distance tests replace hypothesis tests.
    pub fn with_large_sample_rows(mut self, rows: usize) -> Self {
        self.large_sample_rows = rows;
        self
    }

    /// Numeric columns with at most this many distinct reference values are
    /// treated as categories.
    pub fn with_low_cardinality_unique_values(mut self, unique_values: usize) -> Self {
        self.low_cardinality_unique_values = unique_values;
        self
    }

    pub fn thresholds(&self) -> &StatTestThresholds {
        &self.thresholds
    }

    fn chi_square(&self, reference: &[String], current: &[String]) -> StatTestOutcome {
        let table = stats::frequency_table(reference, current);
        match stats::chi_squared_homogeneity(&table) {
            Some(outcome) => StatTestOutcome::from_p_value(
                "chisquare",
                outcome.statistic,
                outcome.p_value,
                self.thresholds.chi_square_p_value,
            ),
            None => StatTestOutcome::not_testable(
                "chisquare",
                "single category in both datasets, treated as not drifted",
            ),
        }
    }
}

fn unique_count(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted.len()
}

impl StatTestSuite for DefaultStatTests {
    fn detect_numeric(&self, reference: &[f64], current: &[f64]) -> Result<StatTestOutcome> {
        if reference.len() > self.large_sample_rows {
            let norm = stats::std_dev(reference).max(MIN_WASSERSTEIN_NORM);
            let distance = stats::wasserstein_distance(reference, current) / norm;
            return Ok(StatTestOutcome::from_distance(
                "wasserstein",
                distance,
                self.thresholds.wasserstein_distance,
            ));
        }

        if unique_count(reference) <= self.low_cardinality_unique_values {
            let as_labels = |values: &[f64]| values.iter().map(f64::to_string).collect::<Vec<_>>();
            return Ok(self.chi_square(&as_labels(reference), &as_labels(current)));
        }

        let outcome = stats::ks_two_sample(reference, current);
        Ok(StatTestOutcome::from_p_value(
            "ks",
            outcome.statistic,
            outcome.p_value,
            self.thresholds.ks_p_value,
        ))
    }

    fn detect_categorical(
        &self,
        reference: &[String],
        current: &[String],
    ) -> Result<StatTestOutcome> {
        if reference.len() > self.large_sample_rows {
            let table = stats::frequency_table(reference, current);
            return Ok(StatTestOutcome::from_distance(
                "jensenshannon",
                stats::jensen_shannon_distance(&table),
                self.thresholds.jensen_shannon_distance,
            ));
        }
        Ok(self.chi_square(reference, current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: i32, end: i32) -> Vec<f64> {
        (start..end).map(f64::from).collect()
    }

    fn labels(pattern: &[&str], repeat: usize) -> Vec<String> {
        pattern
            .iter()
            .cycle()
            .take(pattern.len() * repeat)
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_small_numeric_uses_ks() {
        let tests = DefaultStatTests::default();
        let outcome = tests.detect_numeric(&range(20, 30), &range(20, 30)).unwrap();
        assert_eq!(outcome.stattest_name, "ks");
        assert!(!outcome.drift_detected);

        let outcome = tests.detect_numeric(&range(20, 30), &range(90, 100)).unwrap();
        assert!(outcome.drift_detected);
        assert!(outcome.p_value.unwrap() < 0.05);
    }

    #[test]
    fn test_low_cardinality_numeric_uses_chi_square() {
        let tests = DefaultStatTests::default();
        let reference: Vec<f64> = [0.0, 1.0].iter().cycle().take(40).copied().collect();
        let outcome = tests.detect_numeric(&reference, &reference).unwrap();
        assert_eq!(outcome.stattest_name, "chisquare");
        assert!(!outcome.drift_detected);
    }

    #[test]
    fn test_large_numeric_uses_wasserstein() {
        let tests = DefaultStatTests::default().with_large_sample_rows(100);
        let reference = range(0, 200);
        let outcome = tests.detect_numeric(&reference, &reference).unwrap();
        assert_eq!(outcome.stattest_name, "wasserstein");
        assert_eq!(outcome.drift_score, 0.0);
        assert!(!outcome.drift_detected);

        let shifted = range(1000, 1200);
        assert!(tests.detect_numeric(&reference, &shifted).unwrap().drift_detected);
    }

    #[test]
    fn test_categorical_chi_square() {
        let tests = DefaultStatTests::default();
        let reference = labels(&["red", "blue"], 30);
        let outcome = tests.detect_categorical(&reference, &reference).unwrap();
        assert_eq!(outcome.stattest_name, "chisquare");
        assert!(!outcome.drift_detected);

        let current = labels(&["green"], 60);
        assert!(tests.detect_categorical(&reference, &current).unwrap().drift_detected);
    }

    #[test]
    fn test_single_category_is_not_testable() {
        let tests = DefaultStatTests::default();
        let reference = labels(&["only"], 10);
        let outcome = tests.detect_categorical(&reference, &reference).unwrap();
        assert!(!outcome.drift_detected);
        assert!(outcome.note.is_some());
    }

    #[test]
    fn test_large_categorical_uses_jensen_shannon() {
        let tests = DefaultStatTests::default().with_large_sample_rows(10);
        let reference = labels(&["a", "b"], 20);
        let outcome = tests
            .detect_categorical(&reference, &labels(&["c"], 40))
            .unwrap();
        assert_eq!(outcome.stattest_name, "jensenshannon");
        assert!(outcome.drift_detected);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(StatTestThresholds::default().validate().is_ok());

        let bad = StatTestThresholds {
            ks_p_value: 1.5,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = StatTestThresholds {
            wasserstein_distance: f64::NAN,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
