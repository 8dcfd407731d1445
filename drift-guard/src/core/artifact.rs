//! Inputs and outputs of a validation run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Paths produced by the upstream ingestion stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionArtifact {
    pub trained_file_path: PathBuf,
    pub test_file_path: PathBuf,
}

impl IngestionArtifact {
    pub fn new(trained_file_path: impl Into<PathBuf>, test_file_path: impl Into<PathBuf>) -> Self {
        Self {
            trained_file_path: trained_file_path.into(),
            test_file_path: test_file_path.into(),
        }
    }
}

/// Final pass/fail decision of a validation run plus the paths downstream
/// stages consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationArtifact {
    pub validation_status: bool,
    pub valid_train_file_path: PathBuf,
    pub valid_test_file_path: PathBuf,
    pub invalid_train_file_path: PathBuf,
    pub invalid_test_file_path: PathBuf,
    pub drift_report_file_path: PathBuf,
    /// Schema verdict for the train set
    pub schema_train_status: bool,
    /// Schema verdict for the test set
    pub schema_test_status: bool,
    pub dataset_drift: bool,
}

impl ValidationArtifact {
    pub fn is_valid(&self) -> bool {
        self.validation_status
    }

    pub fn drift_report_file_path(&self) -> &Path {
        &self.drift_report_file_path
    }
}

/// A run passes only when both datasets match the schema and no dataset
/// drift was detected.
pub fn combine_validation_status(
    schema_train: bool,
    schema_test: bool,
    dataset_drift: bool,
) -> bool {
    schema_train && schema_test && !dataset_drift
}
