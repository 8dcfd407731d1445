//! The validation orchestrator.

use super::artifact::{combine_validation_status, IngestionArtifact, ValidationArtifact};
use super::config::ValidationConfig;
use super::phase::ValidationPhase;
use crate::dataset::Dataset;
use crate::drift::{ColumnDriftDetector, DriftAggregator, DriftReport, StatTestSuite};
use crate::logging::truncate_field;
use crate::prelude::*;
use crate::report_writer::{FileReportWriter, ReportWriter};
use crate::schema::{Schema, SchemaChecker, SchemaSource, YamlSchemaSource};
use crate::sources::{CsvDatasetLoader, DatasetLoader};
use crate::{log_column, perf_debug};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Schema file read when no schema source is configured.
pub const DEFAULT_SCHEMA_FILE_PATH: &str = "config/schema.yaml";

/// Everything a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRun {
    pub artifact: ValidationArtifact,
    pub report: DriftReport,
}

/// Validates a train/test pair against the expected schema and against each
/// other.
///
/// A run moves through the phases of [`ValidationPhase`] in order and stops
/// at the first error; a failed run never yields an artifact.
///
/// # Examples
///
/// ```rust
/// use drift_guard::core::{DataValidator, IngestionArtifact, ValidationConfig};
/// use drift_guard::dataset::{Column, Dataset};
/// use drift_guard::schema::Schema;
/// use drift_guard::sources::InMemoryLoader;
///
/// # async fn example() -> drift_guard::error::Result<()> {
/// let dir = tempfile::tempdir()?;
/// let train = Dataset::try_new(vec![Column::numeric("age", (20..30).map(f64::from))])?;
/// let test = Dataset::try_new(vec![Column::numeric("age", (90..100).map(f64::from))])?;
///
/// let validator = DataValidator::builder(
///     IngestionArtifact::new("train.csv", "test.csv"),
///     ValidationConfig::from_artifact_dir(dir.path()),
/// )
/// .schema_source(Schema::from_names(["age"]))
/// .loader(
///     InMemoryLoader::new()
///         .with_dataset("train.csv", train)
///         .with_dataset("test.csv", test),
/// )
/// .build()?;
///
/// let artifact = validator.run().await?;
/// assert!(!artifact.validation_status);
/// assert!(artifact.dataset_drift);
/// # Ok(())
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(example()).unwrap();
/// ```
#[derive(Debug)]
pub struct DataValidator {
    ingestion: IngestionArtifact,
    config: ValidationConfig,
    checker: SchemaChecker,
    aggregator: DriftAggregator,
    loader: Arc<dyn DatasetLoader>,
    report_writer: Arc<dyn ReportWriter>,
    log_config: LogConfig,
}

impl DataValidator {
    /// Starts building a validator for one ingestion output.
    pub fn builder(ingestion: IngestionArtifact, config: ValidationConfig) -> DataValidatorBuilder {
        DataValidatorBuilder::new(ingestion, config)
    }

    pub fn schema(&self) -> &Schema {
        self.checker.schema()
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn ingestion(&self) -> &IngestionArtifact {
        &self.ingestion
    }

    /// Runs every phase and returns the artifact.
    pub async fn run(&self) -> Result<ValidationArtifact> {
        self.run_detailed().await.map(|run| run.artifact)
    }

    /// Runs every phase and returns the artifact together with the drift
    /// report that was persisted.
    #[instrument(skip(self), fields(
        train.path = %self.ingestion.trained_file_path.display(),
        test.path = %self.ingestion.test_file_path.display()
    ))]
    pub async fn run_detailed(&self) -> Result<ValidationRun> {
        info!(
            loader = %self.loader.description(),
            schema.columns = self.checker.schema().column_count(),
            "Starting data validation"
        );
        let start_time = Instant::now();

        match self.execute().await {
            Ok(run) => {
                info!(
                    validation.status = run.artifact.validation_status,
                    validation.dataset_drift = run.artifact.dataset_drift,
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "Data validation completed"
                );
                Ok(run)
            }
            Err(e) => {
                error!(
                    phase = %e.phase(),
                    error = %truncate_field(&e.to_string(), self.log_config.max_field_length),
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "Data validation failed"
                );
                Err(e)
            }
        }
    }

    async fn execute(&self) -> Result<ValidationRun> {
        self.enter(ValidationPhase::LoadDatasets);
        let (train, test) = tokio::try_join!(
            self.load_dataset(&self.ingestion.trained_file_path),
            self.load_dataset(&self.ingestion.test_file_path)
        )?;
        let (train, test) = (Arc::new(train), Arc::new(test));

        self.enter(ValidationPhase::CheckSchemas);
        let (schema_train, schema_test) = self.checker.check_dataset_pair(&train, &test);

        self.enter(ValidationPhase::DetectDrift);
        let report = self.detect_drift(Arc::clone(&train), Arc::clone(&test)).await?;
        for column in report.columns() {
            log_column!(
                self.log_config,
                column = %column.column_name,
                stattest = %column.stattest_name,
                drift_score = column.drift_score,
                drift_detected = column.drift_detected,
                "Column drift result"
            );
        }

        self.enter(ValidationPhase::Combine);
        let dataset_drift = report.dataset_drift();
        let validation_status = combine_validation_status(schema_train, schema_test, dataset_drift);
        debug!(
            schema_train,
            schema_test, dataset_drift, validation_status, "Validation verdict combined"
        );

        self.enter(ValidationPhase::PersistReport);
        self.persist_report(&report)?;

        self.enter(ValidationPhase::EmitArtifact);
        let artifact = ValidationArtifact {
            validation_status,
            valid_train_file_path: self.ingestion.trained_file_path.clone(),
            valid_test_file_path: self.ingestion.test_file_path.clone(),
            invalid_train_file_path: self.config.invalid_train_file_path.clone(),
            invalid_test_file_path: self.config.invalid_test_file_path.clone(),
            drift_report_file_path: self.config.drift_report_file_path.clone(),
            schema_train_status: schema_train,
            schema_test_status: schema_test,
            dataset_drift,
        };
        info!(artifact = ?artifact, "Data validation artifact");

        self.enter(ValidationPhase::Done);
        Ok(ValidationRun { artifact, report })
    }

    fn enter(&self, phase: ValidationPhase) {
        perf_debug!(self.log_config, phase = %phase, "Entering validation phase");
    }

    async fn load_dataset(&self, path: &Path) -> Result<Dataset> {
        self.loader.load(path).await.map_err(|e| {
            if matches!(e, DriftError::DatasetLoad { .. }) {
                e
            } else {
                DriftError::dataset_load_with_source(path, "loader failed", Box::new(e))
            }
        })
    }

    /// Runs the aggregator on the blocking pool, bounded by the configured
    /// timeout. On timeout the detached task's result is discarded.
    async fn detect_drift(
        &self,
        reference: Arc<Dataset>,
        current: Arc<Dataset>,
    ) -> Result<DriftReport> {
        let aggregator = self.aggregator.clone();
        let task =
            tokio::task::spawn_blocking(move || aggregator.aggregate(&reference, &current));

        let joined = match self.config.drift_timeout {
            // Blocking tasks cannot be cancelled. On timeout the aggregation
            // keeps running to completion on the blocking pool and its report
            // is dropped.
            Some(limit) => tokio::time::timeout(limit, task)
                .await
                .map_err(|_| DriftError::DriftTimeout { timeout: limit })?,
            None => task.await,
        };

        joined.map_err(|e| DriftError::Internal(format!("drift detection task failed: {e}")))?
    }

    fn persist_report(&self, report: &DriftReport) -> Result<()> {
        let path = &self.config.drift_report_file_path;
        let max_attempts = self.config.report_write_retries + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.report_writer.write(path, report) {
                Ok(()) => {
                    info!(report.path = %path.display(), attempt, "Drift report persisted");
                    return Ok(());
                }
                Err(e) if attempt < max_attempts => {
                    warn!(
                        report.path = %path.display(),
                        attempt,
                        error = %e,
                        "Drift report write failed, retrying"
                    );
                }
                Err(e) => {
                    return Err(DriftError::ReportPersist {
                        path: path.clone(),
                        attempts: attempt,
                        message: e.to_string(),
                        source: Some(Box::new(e)),
                    });
                }
            }
        }
    }
}

/// Builder for [`DataValidator`].
#[derive(Debug)]
pub struct DataValidatorBuilder {
    ingestion: IngestionArtifact,
    config: ValidationConfig,
    schema_source: Option<Arc<dyn SchemaSource>>,
    loader: Option<Arc<dyn DatasetLoader>>,
    report_writer: Option<Arc<dyn ReportWriter>>,
    stat_tests: Option<Arc<dyn StatTestSuite>>,
    log_config: LogConfig,
}

impl DataValidatorBuilder {
    fn new(ingestion: IngestionArtifact, config: ValidationConfig) -> Self {
        Self {
            ingestion,
            config,
            schema_source: None,
            loader: None,
            report_writer: None,
            stat_tests: None,
            log_config: LogConfig::default(),
        }
    }

    /// Sets where the expected schema comes from. Defaults to the YAML file
    /// at [`DEFAULT_SCHEMA_FILE_PATH`].
    pub fn schema_source(mut self, source: impl SchemaSource + 'static) -> Self {
        self.schema_source = Some(Arc::new(source));
        self
    }

    /// Sets the dataset loader. Defaults to [`CsvDatasetLoader`].
    pub fn loader(mut self, loader: impl DatasetLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Sets the report writer. Defaults to [`FileReportWriter`].
    pub fn report_writer(mut self, writer: impl ReportWriter + 'static) -> Self {
        self.report_writer = Some(Arc::new(writer));
        self
    }

    /// Replaces the statistical tests built from the drift configuration.
    pub fn stat_tests(mut self, tests: impl StatTestSuite + 'static) -> Self {
        self.stat_tests = Some(Arc::new(tests));
        self
    }

    pub fn log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Validates the configuration and reads the schema.
    pub fn build(self) -> Result<DataValidator> {
        self.config.validate()?;

        let schema_source = self
            .schema_source
            .unwrap_or_else(|| Arc::new(YamlSchemaSource::new(DEFAULT_SCHEMA_FILE_PATH)));
        let schema = schema_source.read_schema().map_err(|e| {
            if matches!(e, DriftError::SchemaRead { .. }) {
                e
            } else {
                DriftError::schema_read_with_source(
                    format!("{schema_source:?}"),
                    "schema source failed",
                    Box::new(e),
                )
            }
        })?;

        let aggregator = match self.stat_tests {
            Some(tests) => DriftAggregator::new(
                ColumnDriftDetector::new(tests),
                self.config.drift.drift_share,
            ),
            None => self.config.drift.build_aggregator(),
        };

        let log_config = self.log_config;
        let loader = self.loader.unwrap_or_else(|| {
            Arc::new(CsvDatasetLoader::default().with_log_config(log_config.clone()))
        });

        Ok(DataValidator {
            checker: SchemaChecker::new(schema).with_mode(self.config.schema_mode),
            ingestion: self.ingestion,
            config: self.config,
            aggregator,
            loader,
            report_writer: self
                .report_writer
                .unwrap_or_else(|| Arc::new(FileReportWriter::new())),
            log_config,
        })
    }
}
