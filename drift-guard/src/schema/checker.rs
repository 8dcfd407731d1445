//! Schema conformance checks.

use super::Schema;
use crate::dataset::Dataset;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, instrument};

/// How strictly a dataset must match the expected schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaMode {
    /// Only the number of columns must match
    #[default]
    ColumnCount,
    /// The number of columns and every column name must match
    Strict,
}

/// Detailed comparison of a dataset against the expected schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaCheckOutcome {
    pub expected_column_count: usize,
    pub actual_column_count: usize,
    /// Expected columns the dataset lacks, in schema order
    pub missing_columns: Vec<String>,
    /// Dataset columns the schema does not list, in dataset order
    pub unexpected_columns: Vec<String>,
}

impl SchemaCheckOutcome {
    pub fn count_matches(&self) -> bool {
        self.expected_column_count == self.actual_column_count
    }

    pub fn names_match(&self) -> bool {
        self.missing_columns.is_empty() && self.unexpected_columns.is_empty()
    }

    /// Verdict under the given mode.
    pub fn passes(&self, mode: SchemaMode) -> bool {
        match mode {
            SchemaMode::ColumnCount => self.count_matches(),
            SchemaMode::Strict => self.count_matches() && self.names_match(),
        }
    }
}

/// Checks datasets against the expected schema.
///
/// # Examples
///
/// ```rust
/// use drift_guard::dataset::{Column, Dataset};
/// use drift_guard::schema::{Schema, SchemaChecker};
///
/// let checker = SchemaChecker::new(Schema::from_names(["age", "city"]));
/// let dataset = Dataset::try_new(vec![
///     Column::numeric("age", [31.0]),
///     Column::text("city", ["Lisbon"]),
/// ])
/// .unwrap();
///
/// assert!(checker.validate(&dataset));
/// assert!(!SchemaChecker::check(&dataset, 3));
/// ```
#[derive(Debug, Clone)]
pub struct SchemaChecker {
    schema: Schema,
    mode: SchemaMode,
}

impl SchemaChecker {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            mode: SchemaMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: SchemaMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn mode(&self) -> SchemaMode {
        self.mode
    }

    /// True iff the dataset has exactly `expected_column_count` columns.
    #[instrument(skip(dataset), fields(actual = dataset.num_columns()))]
    pub fn check(dataset: &Dataset, expected_column_count: usize) -> bool {
        let status = dataset.num_columns() == expected_column_count;
        info!(status, "Is required column present[{status}]");
        status
    }

    /// Compares column counts and names against the schema.
    pub fn inspect(&self, dataset: &Dataset) -> SchemaCheckOutcome {
        let expected: HashSet<&str> = self.schema.column_names().into_iter().collect();
        let actual: HashSet<&str> = dataset.column_names().into_iter().collect();

        SchemaCheckOutcome {
            expected_column_count: self.schema.column_count(),
            actual_column_count: dataset.num_columns(),
            missing_columns: self
                .schema
                .column_names()
                .into_iter()
                .filter(|name| !actual.contains(name))
                .map(str::to_string)
                .collect(),
            unexpected_columns: dataset
                .column_names()
                .into_iter()
                .filter(|name| !expected.contains(name))
                .map(str::to_string)
                .collect(),
        }
    }

    /// Verdict for one dataset under the configured mode.
    pub fn validate(&self, dataset: &Dataset) -> bool {
        match self.mode {
            SchemaMode::ColumnCount => Self::check(dataset, self.schema.column_count()),
            SchemaMode::Strict => {
                let outcome = self.inspect(dataset);
                let status = outcome.passes(SchemaMode::Strict);
                info!(
                    status,
                    missing = ?outcome.missing_columns,
                    unexpected = ?outcome.unexpected_columns,
                    "Is required column present[{status}]"
                );
                status
            }
        }
    }

    /// Validates the train and test sets independently.
    pub fn check_dataset_pair(&self, train: &Dataset, test: &Dataset) -> (bool, bool) {
        let train_status = self.validate(train);
        info!("Validated dataset schema columns on the train set");
        let test_status = self.validate(test);
        info!("Validated dataset schema columns on the test set");
        (train_status, test_status)
    }
}
