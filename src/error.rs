use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning a file into a [`LoggerTable`](crate::data::model::LoggerTable).
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed delimited data: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read parquet table: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("unsupported parquet column: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("file contains no header line")]
    NoHeader,

    /// The table has no time axis; nothing downstream is meaningful.
    #[error("Datum stamp \"{column}\" is missing in tsv-data\n{preview}")]
    MissingTimestampColumn { column: String, preview: String },

    #[error("no data rows left after sanitizing")]
    NoDataRows,
}

/// Per-sensor statistics failure; the sensor is left out of the summary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("column {sensor} holds non-numeric value {value:?}")]
    NonNumeric { sensor: String, value: String },

    #[error("column {0} has no values in the evaluated rows")]
    NoValues(String),

    #[error("timestamp {0:?} is not in YYYY-MM-DDTHH:MM:SS form")]
    BadTimestamp(String),
}

/// Errors that can occur while building or rendering a figure.
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("no recognized sensor column to plot")]
    NoSensors,

    #[error("sensor column {0} is not numeric")]
    NonNumeric(String),

    #[error("failed to draw chart: {0}")]
    Drawing(String),

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to serialize plot data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures writing one of the output files.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Typically a spreadsheet application keeping the file open.
    #[error(
        "Failed to open {path}.\nClose other application (e.g. Excel) blocking it."
    )]
    Locked { path: PathBuf },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write delimited file: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write parquet file: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("failed to build arrow batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("failed to build workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("table of {rows} rows x {columns} columns does not fit on a worksheet")]
    SheetLimit { rows: usize, columns: usize },

    #[error("failed to serialize statistics: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Plot(#[from] PlotError),
}

impl ExportError {
    /// Classify an I/O failure on `path`, separating locked files.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied || is_sharing_violation(&source) {
            ExportError::Locked { path }
        } else {
            ExportError::Write { path, source }
        }
    }
}

/// ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION: another process holds the file.
#[cfg(windows)]
fn is_sharing_violation(source: &std::io::Error) -> bool {
    matches!(source.raw_os_error(), Some(32 | 33))
}

#[cfg(not(windows))]
fn is_sharing_violation(_source: &std::io::Error) -> bool {
    false
}

/// Anything that ends a run.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("cannot compute run duration: {0}")]
    Duration(#[from] StatsError),
}

impl ReportError {
    /// Whether the failure is a file held open by another process.
    pub fn is_locked_output(&self) -> bool {
        matches!(self, ReportError::Export(ExportError::Locked { .. }))
    }
}
