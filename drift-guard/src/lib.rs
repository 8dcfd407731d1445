//! # drift-guard - Train/test validation for ML pipelines
//!
//! drift-guard decides whether a freshly ingested train/test split is fit for
//! model training. It checks both datasets against an expected schema,
//! compares the test set to the train set column by column for
//! distribution drift, and combines the verdicts into a single
//! [`ValidationArtifact`](core::ValidationArtifact). Files are read through
//! DataFusion's CSV reader.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use drift_guard::prelude::*;
//! use drift_guard::schema::YamlSchemaSource;
//!
//! # async fn example() -> drift_guard::error::Result<()> {
//! let validator = DataValidator::builder(
//!     IngestionArtifact::new("artifacts/ingested/train.csv", "artifacts/ingested/test.csv"),
//!     ValidationConfig::from_artifact_dir("artifacts"),
//! )
//! .schema_source(YamlSchemaSource::new("config/schema.yaml"))
//! .build()?;
//!
//! let artifact = validator.run().await?;
//! if !artifact.validation_status {
//!     println!("Rejected, see {}", artifact.drift_report_file_path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Drift detection
//!
//! Each column present in both datasets gets one statistical test:
//!
//! | Column      | Reference rows ≤ 1000          | Reference rows > 1000 |
//! |-------------|--------------------------------|-----------------------|
//! | Numeric     | Kolmogorov-Smirnov (p < 0.05)  | Wasserstein (≥ 0.1)   |
//! | Categorical | chi-squared (p < 0.05)         | Jensen-Shannon (≥ 0.1)|
//!
//! Numeric columns with at most five distinct reference values are tested as
//! categorical. The dataset drifts when more than half of the compared
//! columns drift. The tests can be replaced through
//! [`StatTestSuite`](drift::StatTestSuite).
//!
//! ## Architecture
//!
//! - **`core`**: the [`DataValidator`](core::DataValidator) orchestrator, its
//!   configuration and the emitted artifact
//! - **`dataset`**: in-memory columnar datasets built from Arrow batches
//! - **`schema`**: expected schema, YAML schema source and schema checks
//! - **`drift`**: statistical tests, per-column detection and aggregation
//! - **`sources`**: dataset loaders
//! - **`report_writer`**: drift report persistence
//! - **`logging`**: logging configuration and subscriber setup

pub mod core;
pub mod dataset;
pub mod drift;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod report_writer;
pub mod schema;
pub mod sources;
