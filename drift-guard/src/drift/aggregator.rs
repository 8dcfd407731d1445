//! Dataset-level drift aggregation.

use super::detector::ColumnDriftDetector;
use super::report::{DatasetSide, DriftReport, SkippedColumn};
use crate::dataset::Dataset;
use crate::prelude::*;
use std::collections::HashSet;
use tracing::{info, instrument};

/// Default share of drifted columns the dataset must exceed to be drifted.
pub const DEFAULT_DRIFT_SHARE: f64 = 0.5;

/// Runs the column detector over every column the two datasets share and
/// summarizes the results into a [`DriftReport`].
///
/// # Examples
///
/// ```rust
/// use drift_guard::dataset::{Column, Dataset};
/// use drift_guard::drift::DriftAggregator;
///
/// let ages = |range: std::ops::Range<i32>| Column::numeric("age", range.map(f64::from));
/// let reference = Dataset::try_new(vec![ages(20..30)]).unwrap();
/// let current = Dataset::try_new(vec![ages(90..100)]).unwrap();
///
/// let report = DriftAggregator::default().aggregate(&reference, &current).unwrap();
/// assert!(report.dataset_drift());
/// assert_eq!(report.number_of_drifted_columns(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DriftAggregator {
    detector: ColumnDriftDetector,
    drift_share: f64,
}

impl Default for DriftAggregator {
    fn default() -> Self {
        Self {
            detector: ColumnDriftDetector::default(),
            drift_share: DEFAULT_DRIFT_SHARE,
        }
    }
}

impl DriftAggregator {
    pub fn new(detector: ColumnDriftDetector, drift_share: f64) -> Self {
        Self {
            detector,
            drift_share,
        }
    }

    pub fn drift_share(&self) -> f64 {
        self.drift_share
    }

    /// Compares `current` against `reference`.
    ///
    /// Columns are compared in reference column order. Columns present in
    /// only one dataset are listed in the report's skipped columns. Fails
    /// with [`DriftError::EmptyComparison`] when no column is shared.
    #[instrument(skip_all, fields(
        reference.columns = reference.num_columns(),
        current.columns = current.num_columns()
    ))]
    pub fn aggregate(&self, reference: &Dataset, current: &Dataset) -> Result<DriftReport> {
        let reference_names: HashSet<&str> = reference.column_names().into_iter().collect();
        let current_names: HashSet<&str> = current.column_names().into_iter().collect();

        let mut skipped = Vec::new();
        for name in reference.column_names() {
            if !current_names.contains(name) {
                skipped.push(SkippedColumn {
                    column_name: name.to_string(),
                    present_in: DatasetSide::Reference,
                });
            }
        }
        for name in current.column_names() {
            if !reference_names.contains(name) {
                skipped.push(SkippedColumn {
                    column_name: name.to_string(),
                    present_in: DatasetSide::Current,
                });
            }
        }

        let mut results = Vec::new();
        for reference_column in reference.columns() {
            if let Some(current_column) = current.column(reference_column.name()) {
                results.push(self.detector.detect(reference_column, current_column)?);
            }
        }

        if results.is_empty() {
            return Err(DriftError::EmptyComparison {
                reference_columns: reference.num_columns(),
                current_columns: current.num_columns(),
            });
        }

        let report = DriftReport::from_columns(results, skipped, self.drift_share);
        info!(
            drifted = report.number_of_drifted_columns(),
            columns = report.number_of_columns(),
            skipped = report.skipped_columns().len(),
            dataset_drift = report.dataset_drift(),
            "{}/{} drift detected.",
            report.number_of_drifted_columns(),
            report.number_of_columns()
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;

    fn dataset(columns: Vec<Column>) -> Dataset {
        Dataset::try_new(columns).unwrap()
    }

    fn ages(start: i32) -> Column {
        Column::numeric("age", (start..start + 10).map(f64::from))
    }

    #[test]
    fn test_identical_datasets_do_not_drift() {
        let data = dataset(vec![ages(20), Column::text("city", ["a", "b"].repeat(5))]);
        let report = DriftAggregator::default().aggregate(&data, &data).unwrap();
        assert_eq!(report.number_of_columns(), 2);
        assert_eq!(report.number_of_drifted_columns(), 0);
        assert!(!report.dataset_drift());
    }

    #[test]
    fn test_single_drifted_column_drifts_dataset() {
        let reference = dataset(vec![ages(20)]);
        let current = dataset(vec![ages(90)]);
        let report = DriftAggregator::default()
            .aggregate(&reference, &current)
            .unwrap();
        assert!(report.column("age").unwrap().drift_detected);
        assert_eq!(report.share_of_drifted_columns(), 1.0);
        assert!(report.dataset_drift());
    }

    #[test]
    fn test_results_follow_reference_order_and_skip_unshared() {
        let reference = dataset(vec![
            Column::numeric("b", (0..10).map(f64::from)),
            Column::numeric("only_ref", (0..10).map(f64::from)),
            ages(20),
        ]);
        let current = dataset(vec![
            ages(20),
            Column::numeric("only_cur", (0..10).map(f64::from)),
            Column::numeric("b", (0..10).map(f64::from)),
        ]);

        let report = DriftAggregator::default()
            .aggregate(&reference, &current)
            .unwrap();
        let names: Vec<&str> = report
            .columns()
            .iter()
            .map(|c| c.column_name.as_str())
            .collect();
        assert_eq!(names, vec!["b", "age"]);
        assert_eq!(
            report.skipped_columns(),
            &[
                SkippedColumn {
                    column_name: "only_ref".to_string(),
                    present_in: DatasetSide::Reference,
                },
                SkippedColumn {
                    column_name: "only_cur".to_string(),
                    present_in: DatasetSide::Current,
                },
            ]
        );
    }

    #[test]
    fn test_no_shared_columns_is_an_error() {
        let reference = dataset(vec![ages(20)]);
        let current = dataset(vec![Column::numeric("height", (0..10).map(f64::from))]);
        let err = DriftAggregator::default()
            .aggregate(&reference, &current)
            .unwrap_err();
        assert!(matches!(
            err,
            DriftError::EmptyComparison {
                reference_columns: 1,
                current_columns: 1
            }
        ));
    }

    #[test]
    fn test_empty_datasets_are_an_error() {
        let err = DriftAggregator::default()
            .aggregate(&Dataset::empty(), &Dataset::empty())
            .unwrap_err();
        assert!(matches!(err, DriftError::EmptyComparison { .. }));
    }

    #[test]
    fn test_configurable_drift_share() {
        let reference = dataset(vec![ages(20), Column::numeric("b", (0..10).map(f64::from))]);
        let current = dataset(vec![ages(90), Column::numeric("b", (0..10).map(f64::from))]);

        let lenient = DriftAggregator::default()
            .aggregate(&reference, &current)
            .unwrap();
        assert!(!lenient.dataset_drift());

        let strict = DriftAggregator::new(ColumnDriftDetector::default(), 0.25)
            .aggregate(&reference, &current)
            .unwrap();
        assert!(strict.dataset_drift());
        assert_eq!(strict.drift_share_threshold(), 0.25);
    }
}
