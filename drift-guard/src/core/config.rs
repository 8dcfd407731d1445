//! Configuration for validation runs.

use crate::drift::{
    ColumnDriftDetector, DefaultStatTests, DriftAggregator, StatTestThresholds,
    DEFAULT_DRIFT_SHARE,
};
use crate::prelude::*;
use crate::schema::SchemaMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const DATA_VALIDATION_DIR_NAME: &str = "data_validation";
const INVALID_DATA_DIR_NAME: &str = "invalid";
const DRIFT_REPORT_DIR_NAME: &str = "drift_report";
const DRIFT_REPORT_FILE_NAME: &str = "report.yaml";
const TRAIN_FILE_NAME: &str = "train.csv";
const TEST_FILE_NAME: &str = "test.csv";

/// Parameters of the drift engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Dataset drifts when the share of drifted columns exceeds this
    pub drift_share: f64,
    /// Per-test thresholds
    pub thresholds: StatTestThresholds,
    /// Reference row count above which distance tests are used
    pub large_sample_rows: usize,
    /// Numeric columns with at most this many distinct values are tested as categories
    pub low_cardinality_unique_values: usize,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            drift_share: DEFAULT_DRIFT_SHARE,
            thresholds: StatTestThresholds::default(),
            large_sample_rows: 1000,
            low_cardinality_unique_values: 5,
        }
    }
}

impl DriftConfig {
    pub fn with_drift_share(mut self, drift_share: f64) -> Self {
        self.drift_share = drift_share;
        self
    }

    pub fn with_thresholds(mut self, thresholds: StatTestThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_large_sample_rows(mut self, rows: usize) -> Self {
        self.large_sample_rows = rows;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.drift_share > 0.0 && self.drift_share <= 1.0) {
            return Err(DriftError::Configuration(format!(
                "drift_share must be a fraction in (0, 1], got {}",
                self.drift_share
            )));
        }
        self.thresholds.validate()
    }

    /// Builds the aggregator these settings describe.
    pub fn build_aggregator(&self) -> DriftAggregator {
        let tests = DefaultStatTests::new(self.thresholds)
            .with_large_sample_rows(self.large_sample_rows)
            .with_low_cardinality_unique_values(self.low_cardinality_unique_values);
        DriftAggregator::new(ColumnDriftDetector::new(Arc::new(tests)), self.drift_share)
    }
}

/// Paths and policies for a validation run.
///
/// The invalid-data paths are passed through to the artifact unchanged; the
/// validator never moves files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub drift_report_file_path: PathBuf,
    pub invalid_train_file_path: PathBuf,
    pub invalid_test_file_path: PathBuf,
    #[serde(default)]
    pub schema_mode: SchemaMode,
    #[serde(default)]
    pub drift: DriftConfig,
    /// Wall-clock limit for the drift detection phase
    #[serde(default)]
    pub drift_timeout: Option<Duration>,
    /// Extra attempts after a failed report write
    #[serde(default = "default_report_write_retries")]
    pub report_write_retries: usize,
}

fn default_report_write_retries() -> usize {
    1
}

impl ValidationConfig {
    /// Creates a configuration with explicit paths and default policies.
    pub fn new(
        drift_report_file_path: impl Into<PathBuf>,
        invalid_train_file_path: impl Into<PathBuf>,
        invalid_test_file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            drift_report_file_path: drift_report_file_path.into(),
            invalid_train_file_path: invalid_train_file_path.into(),
            invalid_test_file_path: invalid_test_file_path.into(),
            schema_mode: SchemaMode::default(),
            drift: DriftConfig::default(),
            drift_timeout: None,
            report_write_retries: default_report_write_retries(),
        }
    }

    /// Lays out the standard paths under a pipeline artifact directory:
    ///
    /// ```text
    /// <artifact_dir>/data_validation/drift_report/report.yaml
    /// <artifact_dir>/data_validation/invalid/train.csv
    /// <artifact_dir>/data_validation/invalid/test.csv
    /// ```
    pub fn from_artifact_dir(artifact_dir: impl AsRef<Path>) -> Self {
        let validation_dir = artifact_dir.as_ref().join(DATA_VALIDATION_DIR_NAME);
        let invalid_dir = validation_dir.join(INVALID_DATA_DIR_NAME);
        Self::new(
            validation_dir
                .join(DRIFT_REPORT_DIR_NAME)
                .join(DRIFT_REPORT_FILE_NAME),
            invalid_dir.join(TRAIN_FILE_NAME),
            invalid_dir.join(TEST_FILE_NAME),
        )
    }

    pub fn with_schema_mode(mut self, mode: SchemaMode) -> Self {
        self.schema_mode = mode;
        self
    }

    pub fn with_drift(mut self, drift: DriftConfig) -> Self {
        self.drift = drift;
        self
    }

    pub fn with_drift_timeout(mut self, timeout: Duration) -> Self {
        self.drift_timeout = Some(timeout);
        self
    }

    pub fn with_report_write_retries(mut self, retries: usize) -> Self {
        self.report_write_retries = retries;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.drift_report_file_path.as_os_str().is_empty() {
            return Err(DriftError::Configuration(
                "drift_report_file_path must not be empty".to_string(),
            ));
        }
        if self.drift_timeout == Some(Duration::ZERO) {
            return Err(DriftError::Configuration(
                "drift_timeout must be greater than zero".to_string(),
            ));
        }
        self.drift.validate()
    }
}
