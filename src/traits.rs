use crate::model::{Report, ReportLayout};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to move report into place: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported report format: {0}")]
    UnsupportedFormat(String),
}

pub trait ReportSink: Send + Sync {
    /// Returns the sink ID used in logs (e.g., "xlsx", "csv").
    fn sink_id(&self) -> &str;

    /// Writes the whole report to `output`, header row first.
    ///
    /// Either the complete artifact lands at `output` or nothing does.
    fn write(&self, report: &Report, layout: &ReportLayout, output: &Path)
        -> Result<(), SinkError>;
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn sink_id(&self) -> &str {
        (**self).sink_id()
    }

    fn write(
        &self,
        report: &Report,
        layout: &ReportLayout,
        output: &Path,
    ) -> Result<(), SinkError> {
        (**self).write(report, layout, output)
    }
}
