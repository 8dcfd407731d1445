//! CSV dataset loader built on DataFusion's CSV reader.

use super::DatasetLoader;
use crate::dataset::Dataset;
use crate::log_data_op;
use crate::prelude::*;
use arrow::datatypes::{DataType, Field, Schema};
use async_trait::async_trait;
use datafusion::prelude::*;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Options for configuring CSV file reading.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Escape character (default: None)
    pub escape: Option<u8>,
    /// Comment prefix (lines starting with this are ignored)
    pub comment: Option<u8>,
    /// Maximum records read to discover the header
    pub schema_infer_max_records: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            escape: None,
            comment: None,
            schema_infer_max_records: 1000,
        }
    }
}

impl CsvOptions {
    /// Options for tab-separated files.
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::default()
        }
    }
}

/// Loads delimited files into a [`Dataset`].
///
/// Every field is read as text and columns are typed by [`Column`] over
/// all rows, so a column is numeric only if every non-missing value parses
/// as a number. Empty fields become missing values.
///
/// [`Column`]: crate::dataset::Column
#[derive(Debug, Clone, Default)]
pub struct CsvDatasetLoader {
    options: CsvOptions,
    log_config: LogConfig,
}

impl CsvDatasetLoader {
    pub fn new(options: CsvOptions) -> Self {
        Self {
            options,
            log_config: LogConfig::default(),
        }
    }

    /// Sets the logging configuration used for data operation logs.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    fn read_options<'a>(&self, extension: &'a str) -> CsvReadOptions<'a> {
        let mut csv_options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .schema_infer_max_records(self.options.schema_infer_max_records)
            .file_extension(extension);
        if let Some(escape) = self.options.escape {
            csv_options = csv_options.escape(escape);
        }
        if let Some(comment) = self.options.comment {
            csv_options = csv_options.comment(comment);
        }
        csv_options
    }

    async fn read(&self, path: &Path) -> Result<Dataset> {
        let path_str = path
            .to_str()
            .ok_or_else(|| DriftError::dataset_load(path, "path contains invalid UTF-8"))?;

        // DataFusion filters listed files by extension, so match the file's own.
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let ctx = SessionContext::new();

        // Only the header is taken from inference. Every field is read as
        // text and typed later by `Column`, so a late non-numeric value
        // cannot fail a column inferred as numeric.
        let inferred = ctx
            .read_csv(path_str, self.read_options(&extension))
            .await?
            .schema()
            .inner()
            .clone();
        let text_schema = Schema::new(
            inferred
                .fields()
                .iter()
                .map(|field| Field::new(field.name(), DataType::Utf8, true))
                .collect::<Vec<_>>(),
        );

        let df = ctx
            .read_csv(path_str, self.read_options(&extension).schema(&text_schema))
            .await?;
        let schema = df.schema().inner().clone();
        let batches = df.collect().await?;

        debug!(
            source.path = %path.display(),
            batches = batches.len(),
            "CSV batches collected"
        );

        Dataset::from_record_batches(&schema, &batches)
    }
}

#[async_trait]
impl DatasetLoader for CsvDatasetLoader {
    #[instrument(skip(self), fields(
        source.type = "csv",
        source.path = %path.display(),
        csv.delimiter = %self.options.delimiter as char,
        csv.has_header = self.options.has_header
    ))]
    async fn load(&self, path: &Path) -> Result<Dataset> {
        log_data_op!(
            self.log_config,
            source.path = %path.display(),
            "Loading CSV dataset"
        );

        if !path.is_file() {
            return Err(DriftError::dataset_load_with_source(
                path,
                "file does not exist",
                Box::new(std::io::Error::from(std::io::ErrorKind::NotFound)),
            ));
        }

        let dataset = self.read(path).await.map_err(|e| {
            if matches!(e, DriftError::DatasetLoad { .. }) {
                e
            } else {
                DriftError::dataset_load_with_source(
                    path,
                    "could not parse delimited file",
                    Box::new(e),
                )
            }
        })?;

        info!(
            source.path = %path.display(),
            columns = dataset.num_columns(),
            rows = dataset.num_rows(),
            "CSV dataset loaded"
        );
        Ok(dataset)
    }

    fn description(&self) -> String {
        let delimiter = self.options.delimiter as char;
        format!("CSV loader (delimiter '{delimiter}')")
    }
}
