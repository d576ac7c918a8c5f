use super::write_atomically;
use crate::model::{Report, ReportLayout};
use crate::traits::{ReportSink, SinkError};
use std::path::Path;

/// CSV sink. Lists are flattened with their delimiter inside a quoted cell.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvSink;

impl ReportSink for CsvSink {
    fn sink_id(&self) -> &str {
        "csv"
    }

    fn write(
        &self,
        report: &Report,
        layout: &ReportLayout,
        output: &Path,
    ) -> Result<(), SinkError> {
        write_atomically(output, |w| {
            let mut writer = ::csv::Writer::from_writer(w);
            writer.write_record(layout.titles())?;
            for record in report.records() {
                let row: Vec<String> = layout
                    .cells(record)
                    .iter()
                    .map(|cell| cell.render().unwrap_or_default())
                    .collect();
                writer.write_record(&row)?;
            }
            writer.flush()?;
            Ok(())
        })
    }
}
