//! Statistical drift detection between a reference and a current dataset.
//!
//! The module is layered leaves first:
//!
//! - [`stats`]: pure statistical primitives (KS, chi-squared, Wasserstein,
//!   Jensen-Shannon)
//! - [`StatTestSuite`]: chooses and runs a test for a numeric or categorical
//!   column pair ([`DefaultStatTests`] is the shipped selection)
//! - [`ColumnDriftDetector`]: classifies a column pair and produces a
//!   [`ColumnDriftResult`]
//! - [`DriftAggregator`]: drives the detector across shared columns and
//!   builds the [`DriftReport`]
//!
//! ```text
//! DriftAggregator::aggregate(reference, current)
//!     ├── shared columns (reference order)
//!     │   └── ColumnDriftDetector::detect ──► StatTestSuite
//!     └── DriftReport { dataset_drift = drifted / shared > drift_share }
//! ```

mod aggregator;
mod detector;
mod report;
pub mod stats;
mod stattest;

pub use aggregator::{DriftAggregator, DEFAULT_DRIFT_SHARE};
pub use detector::ColumnDriftDetector;
pub use report::{ColumnDriftResult, DatasetSide, DriftReport, SkippedColumn, StatTestOutcome};
pub use stattest::{DefaultStatTests, StatTestSuite, StatTestThresholds};
