//! Drift result types.

use crate::dataset::ColumnType;
use serde::{Deserialize, Serialize};

/// Outcome of a single statistical test, before it is attached to a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatTestOutcome {
    /// Name of the test that produced the statistic (e.g. "ks", "chisquare")
    pub stattest_name: String,
    /// Raw test statistic
    pub statistic: f64,
    /// P-value, for hypothesis tests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
    /// Value compared against the threshold: the p-value or the distance
    pub drift_score: f64,
    /// Threshold the score was compared against
    pub stattest_threshold: f64,
    /// Whether the comparison flagged drift
    pub drift_detected: bool,
    /// Explanation when a defensive default was applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl StatTestOutcome {
    /// Outcome of a p-value test; drift when `p_value < threshold`.
    pub fn from_p_value(
        stattest_name: impl Into<String>,
        statistic: f64,
        p_value: f64,
        threshold: f64,
    ) -> Self {
        Self {
            stattest_name: stattest_name.into(),
            statistic,
            p_value: Some(p_value),
            drift_score: p_value,
            stattest_threshold: threshold,
            drift_detected: p_value < threshold,
            note: None,
        }
    }

    /// Outcome of a distance test; drift when `distance >= threshold`.
    pub fn from_distance(stattest_name: impl Into<String>, distance: f64, threshold: f64) -> Self {
        Self {
            stattest_name: stattest_name.into(),
            statistic: distance,
            p_value: None,
            drift_score: distance,
            stattest_threshold: threshold,
            drift_detected: distance >= threshold,
            note: None,
        }
    }

    /// Outcome for degenerate input that cannot be tested; never drifted.
    pub fn not_testable(stattest_name: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            stattest_name: stattest_name.into(),
            statistic: 0.0,
            p_value: None,
            drift_score: 0.0,
            stattest_threshold: 0.0,
            drift_detected: false,
            note: Some(note.into()),
        }
    }
}

/// Drift verdict for one column shared by both datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDriftResult {
    pub column_name: String,
    pub column_type: ColumnType,
    pub stattest_name: String,
    pub statistic: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
    pub drift_score: f64,
    pub stattest_threshold: f64,
    pub drift_detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ColumnDriftResult {
    /// Attaches a test outcome to a column.
    pub fn new(
        column_name: impl Into<String>,
        column_type: ColumnType,
        outcome: StatTestOutcome,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            column_type,
            stattest_name: outcome.stattest_name,
            statistic: outcome.statistic,
            p_value: outcome.p_value,
            drift_score: outcome.drift_score,
            stattest_threshold: outcome.stattest_threshold,
            drift_detected: outcome.drift_detected,
            note: outcome.note,
        }
    }
}

/// Which dataset carries a column that the other one lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetSide {
    Reference,
    Current,
}

/// A column excluded from comparison because only one dataset has it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedColumn {
    pub column_name: String,
    pub present_in: DatasetSide,
}

/// Dataset-level drift summary with the per-column breakdown.
///
/// Built once by the aggregator; fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    number_of_columns: usize,
    number_of_drifted_columns: usize,
    share_of_drifted_columns: f64,
    drift_share_threshold: f64,
    dataset_drift: bool,
    columns: Vec<ColumnDriftResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    skipped_columns: Vec<SkippedColumn>,
}

impl DriftReport {
    /// Summarizes per-column results.
    ///
    /// `dataset_drift` is true iff the share of drifted columns is strictly
    /// greater than `drift_share_threshold`.
    pub fn from_columns(
        columns: Vec<ColumnDriftResult>,
        skipped_columns: Vec<SkippedColumn>,
        drift_share_threshold: f64,
    ) -> Self {
        let number_of_columns = columns.len();
        let number_of_drifted_columns = columns.iter().filter(|c| c.drift_detected).count();
        let share_of_drifted_columns = if number_of_columns == 0 {
            0.0
        } else {
            number_of_drifted_columns as f64 / number_of_columns as f64
        };

        Self {
            number_of_columns,
            number_of_drifted_columns,
            share_of_drifted_columns,
            drift_share_threshold,
            dataset_drift: share_of_drifted_columns > drift_share_threshold,
            columns,
            skipped_columns,
        }
    }

    pub fn number_of_columns(&self) -> usize {
        self.number_of_columns
    }

    pub fn number_of_drifted_columns(&self) -> usize {
        self.number_of_drifted_columns
    }

    pub fn share_of_drifted_columns(&self) -> f64 {
        self.share_of_drifted_columns
    }

    pub fn drift_share_threshold(&self) -> f64 {
        self.drift_share_threshold
    }

    pub fn dataset_drift(&self) -> bool {
        self.dataset_drift
    }

    pub fn columns(&self) -> &[ColumnDriftResult] {
        &self.columns
    }

    pub fn skipped_columns(&self) -> &[SkippedColumn] {
        &self.skipped_columns
    }

    /// Looks up the result for a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDriftResult> {
        self.columns.iter().find(|c| c.column_name == name)
    }
}
