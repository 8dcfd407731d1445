//! Persistence of drift reports.
//!
//! [`FileReportWriter`] serializes a [`DriftReport`] to YAML or JSON,
//! chosen by the file extension, and replaces the destination atomically so
//! a reader never observes a half-written report.

use crate::drift::DriftReport;
use crate::prelude::*;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Serialization format of a persisted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Yaml,
    Json,
}

impl ReportFormat {
    /// Picks the format from the path extension; YAML unless it ends in `.json`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }

    /// Renders a report in this format.
    pub fn render(&self, report: &DriftReport) -> Result<String> {
        match self {
            Self::Yaml => Ok(serde_yaml::to_string(report)?),
            Self::Json => Ok(serde_json::to_string_pretty(report)?),
        }
    }
}

/// Durably stores a drift report at a path.
pub trait ReportWriter: Debug + Send + Sync {
    /// Writes `report` to `path`, creating parent directories as needed.
    fn write(&self, path: &Path, report: &DriftReport) -> Result<()>;
}

/// Writes reports to the local file system.
#[derive(Debug, Clone, Default)]
pub struct FileReportWriter {
    format: Option<ReportFormat>,
}

impl FileReportWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces a format regardless of the file extension.
    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = Some(format);
        self
    }
}

impl ReportWriter for FileReportWriter {
    #[instrument(skip(self, report), fields(report.path = %path.display()))]
    fn write(&self, path: &Path, report: &DriftReport) -> Result<()> {
        let format = self.format.unwrap_or_else(|| ReportFormat::from_path(path));
        let rendered = format.render(report)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }

        let mut staging = PathBuf::from(path);
        staging.as_mut_os_string().push(".tmp");
        std::fs::write(&staging, rendered.as_bytes())
            .with_context(|| format!("writing {}", staging.display()))?;
        std::fs::rename(&staging, path).context("moving staged report into place")?;

        debug!(format = ?format, bytes = rendered.len(), "Drift report written");
        Ok(())
    }
}
