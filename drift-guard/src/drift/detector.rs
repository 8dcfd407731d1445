//! Per-column drift detection.

use super::report::{ColumnDriftResult, StatTestOutcome};
use super::stats;
use super::stattest::{DefaultStatTests, StatTestSuite};
use crate::dataset::{Column, ColumnType};
use crate::prelude::*;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Compares one column of the reference dataset with the same-named column
/// of the current dataset.
///
/// The column pair is numeric only if both sides are numeric. Degenerate
/// pairs (all values missing on either side, or zero variance in a numeric
/// column) are reported as not drifted with a note, and logged.
///
/// # Examples
///
/// ```rust
/// use drift_guard::dataset::Column;
/// use drift_guard::drift::ColumnDriftDetector;
///
/// let detector = ColumnDriftDetector::default();
/// let reference = Column::numeric("age", (20..30).map(f64::from));
/// let current = Column::numeric("age", (90..100).map(f64::from));
///
/// let result = detector.detect(&reference, &current).unwrap();
/// assert!(result.drift_detected);
/// ```
#[derive(Debug, Clone)]
pub struct ColumnDriftDetector {
    tests: Arc<dyn StatTestSuite>,
}

impl Default for ColumnDriftDetector {
    fn default() -> Self {
        Self::new(Arc::new(DefaultStatTests::default()))
    }
}

impl ColumnDriftDetector {
    /// Creates a detector backed by the given test suite.
    pub fn new(tests: Arc<dyn StatTestSuite>) -> Self {
        Self { tests }
    }

    /// Runs the drift test for a column pair.
    #[instrument(skip_all, fields(column = %reference.name()))]
    pub fn detect(&self, reference: &Column, current: &Column) -> Result<ColumnDriftResult> {
        let column_name = reference.name();

        let numeric = match (reference.numeric_values(), current.numeric_values()) {
            (Some(reference_values), Some(current_values)) => {
                Some((reference_values, current_values))
            }
            _ => None,
        };
        let column_type = if numeric.is_some() {
            ColumnType::Numeric
        } else {
            ColumnType::Categorical
        };

        let outcome = match numeric {
            Some((reference_values, current_values)) => {
                self.detect_numeric(column_name, &reference_values, &current_values)?
            }
            None => {
                let reference_values = reference.categorical_values();
                let current_values = current.categorical_values();
                if reference_values.is_empty() || current_values.is_empty() {
                    StatTestOutcome::not_testable(
                        "chisquare",
                        "all values missing in at least one dataset, treated as not drifted",
                    )
                } else if is_constant(&reference_values) || is_constant(&current_values) {
                    StatTestOutcome::not_testable(
                        "chisquare",
                        "single category in at least one dataset, treated as not drifted",
                    )
                } else {
                    self.tests
                        .detect_categorical(&reference_values, &current_values)?
                }
            }
        };

        if let Some(note) = &outcome.note {
            warn!(
                column = %column_name,
                column.type = %column_type,
                reason = %note,
                "Drift test not applicable, defaulting to no drift"
            );
        }
        check_finite(column_name, &outcome)?;

        debug!(
            column = %column_name,
            column.type = %column_type,
            stattest = %outcome.stattest_name,
            drift_score = outcome.drift_score,
            drift_detected = outcome.drift_detected,
            "Column drift computed"
        );

        Ok(ColumnDriftResult::new(column_name, column_type, outcome))
    }

    fn detect_numeric(
        &self,
        column_name: &str,
        reference: &[f64],
        current: &[f64],
    ) -> Result<StatTestOutcome> {
        if reference.is_empty() || current.is_empty() {
            return Ok(StatTestOutcome::not_testable(
                "ks",
                "all values missing in at least one dataset, treated as not drifted",
            ));
        }
        if reference.iter().chain(current).any(|v| v.is_infinite()) {
            return Err(DriftError::column_computation(
                column_name,
                "column contains infinite values",
            ));
        }
        if stats::std_dev(reference) == 0.0 || stats::std_dev(current) == 0.0 {
            return Ok(StatTestOutcome::not_testable(
                "ks",
                "zero variance in at least one dataset, treated as not drifted",
            ));
        }
        self.tests.detect_numeric(reference, current)
    }
}

fn is_constant(values: &[String]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}

fn check_finite(column_name: &str, outcome: &StatTestOutcome) -> Result<()> {
    let p_value_ok = outcome.p_value.map_or(true, f64::is_finite);
    if outcome.statistic.is_finite() && outcome.drift_score.is_finite() && p_value_ok {
        Ok(())
    } else {
        Err(DriftError::column_computation(
            column_name,
            format!(
                "{} produced a non-finite result (statistic={}, p_value={:?})",
                outcome.stattest_name, outcome.statistic, outcome.p_value
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ColumnValues;

    #[derive(Debug)]
    struct NanTests;

    impl StatTestSuite for NanTests {
        fn detect_numeric(&self, _: &[f64], _: &[f64]) -> Result<StatTestOutcome> {
            Ok(StatTestOutcome::from_p_value("broken", f64::NAN, f64::NAN, 0.05))
        }

        fn detect_categorical(&self, _: &[String], _: &[String]) -> Result<StatTestOutcome> {
            Ok(StatTestOutcome::from_distance("broken", f64::INFINITY, 0.1))
        }
    }

    fn ages(start: i32) -> Column {
        Column::numeric("age", (start..start + 10).map(f64::from))
    }

    #[test]
    fn test_identical_ages_do_not_drift() {
        let result = ColumnDriftDetector::default()
            .detect(&ages(20), &ages(20))
            .unwrap();
        assert_eq!(result.column_name, "age");
        assert_eq!(result.column_type, ColumnType::Numeric);
        assert!(!result.drift_detected);
    }

    #[test]
    fn test_shifted_ages_drift() {
        let result = ColumnDriftDetector::default()
            .detect(&ages(20), &ages(90))
            .unwrap();
        assert!(result.drift_detected);
        assert_eq!(result.statistic, 1.0);
    }

    #[test]
    fn test_numeric_against_text_is_categorical() {
        let reference = Column::text("code", ["1", "2", "3"]);
        let current = Column::text("code", ["1", "x", "3"]);
        let result = ColumnDriftDetector::default()
            .detect(&reference, &current)
            .unwrap();
        assert_eq!(result.column_type, ColumnType::Categorical);
    }

    #[test]
    fn test_zero_variance_defaults_to_no_drift() {
        let constant = Column::numeric("flag", [5.0; 20]);
        let result = ColumnDriftDetector::default()
            .detect(&constant, &ages(90))
            .unwrap();
        assert!(!result.drift_detected);
        assert!(result.note.unwrap().contains("zero variance"));
    }

    #[test]
    fn test_single_category_on_one_side_defaults_to_no_drift() {
        let constant = Column::text("grade", ["a"; 40]);
        let mixed = Column::text("grade", (0..40).map(|i| if i % 2 == 0 { "a" } else { "b" }));

        for (reference, current) in [(&constant, &mixed), (&mixed, &constant)] {
            let result = ColumnDriftDetector::default()
                .detect(reference, current)
                .unwrap();
            assert_eq!(result.column_type, ColumnType::Categorical);
            assert!(!result.drift_detected);
            assert!(result.note.unwrap().contains("single category"));
        }
    }

    #[test]
    fn test_all_missing_defaults_to_no_drift() {
        let missing = Column::new("age", ColumnValues::Numeric(vec![None; 10]));
        let result = ColumnDriftDetector::default()
            .detect(&ages(20), &missing)
            .unwrap();
        assert!(!result.drift_detected);
        assert!(result.note.is_some());

        let missing_text = Column::new("city", ColumnValues::Text(vec![None; 4]));
        let city = Column::text("city", ["a", "b", "c", "d"]);
        let result = ColumnDriftDetector::default()
            .detect(&city, &missing_text)
            .unwrap();
        assert!(!result.drift_detected);
    }

    #[test]
    fn test_non_finite_statistic_is_an_error() {
        let detector = ColumnDriftDetector::new(Arc::new(NanTests));
        let err = detector.detect(&ages(20), &ages(30)).unwrap_err();
        assert!(matches!(err, DriftError::ColumnComputation { ref column, .. } if column == "age"));

        let city = Column::text("city", ["a", "b"]);
        assert!(detector.detect(&city, &city).is_err());
    }

    #[test]
    fn test_infinite_values_are_an_error() {
        let reference = Column::numeric("x", [1.0, f64::INFINITY, 3.0]);
        let err = ColumnDriftDetector::default()
            .detect(&reference, &ages(1))
            .unwrap_err();
        assert!(matches!(err, DriftError::ColumnComputation { .. }));
    }
}
