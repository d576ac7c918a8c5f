//! Report sinks: serialize a finished [`Report`](crate::model::Report) into an artifact.
//!
//! Every sink renders into a temporary file next to the destination and
//! renames it into place, so a failed write never leaves a partial report.

pub mod csv;
pub mod json;
pub mod xlsx;

use crate::traits::{ReportSink, SinkError};
use std::io::Write;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

pub use self::csv::CsvSink;
pub use self::json::JsonSink;
pub use self::xlsx::XlsxSink;

/// Picks a sink from the output file extension.
pub fn sink_for_path(output: &Path) -> Result<Box<dyn ReportSink>, SinkError> {
    let extension = output
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" => Ok(Box::new(XlsxSink)),
        "csv" => Ok(Box::new(CsvSink)),
        "json" => Ok(Box::new(JsonSink)),
        _ => Err(SinkError::UnsupportedFormat(output.display().to_string())),
    }
}

/// Temp file whose mode follows the umask like a plain create would.
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

pub(crate) fn write_atomically<F>(output: &Path, render: F) -> Result<(), SinkError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), SinkError>,
{
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = temp_file_in(dir)?;
    render(tmp.as_file_mut())?;
    tmp.as_file_mut().flush()?;
    tmp.persist(output)?;
    Ok(())
}
