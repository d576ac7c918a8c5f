use super::write_atomically;
use crate::model::{Cell, FieldValue, FileRecord, Report, ReportLayout};
use crate::traits::{ReportSink, SinkError};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};
use std::path::Path;
use tracing::{debug, warn};

/// Longest string a worksheet cell accepts, in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Spreadsheet sink: bold centred header row, one row per record.
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxSink;

/// Cuts `text` to [`MAX_CELL_CHARS`], logging which cell lost content.
fn fit_cell(text: String, record: &FileRecord, column: &str) -> String {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => {
            warn!(
                record = record.identifier(),
                column,
                chars = text.chars().count(),
                limit = MAX_CELL_CHARS,
                "Truncating cell to spreadsheet limit"
            );
            text[..cut].to_string()
        }
        None => text,
    }
}

impl XlsxSink {
    fn write_cell(
        worksheet: &mut Worksheet,
        (row, col): (u32, u16),
        cell: Cell<'_>,
        record: &FileRecord,
        column: &str,
        wrap: &Format,
    ) -> Result<(), SinkError> {
        match cell {
            Cell::Value(FieldValue::Integer(i)) => {
                worksheet.write_number(row, col, *i as f64)?;
            }
            Cell::Value(FieldValue::Float(f)) => {
                worksheet.write_number(row, col, *f)?;
            }
            Cell::Value(FieldValue::Missing) | Cell::Empty => {}
            other => {
                let Some(text) = other.render() else {
                    return Ok(());
                };
                let text = fit_cell(text, record, column);
                if text.contains('\n') {
                    worksheet.write_string_with_format(row, col, text, wrap)?;
                } else {
                    worksheet.write_string(row, col, text)?;
                }
            }
        }
        Ok(())
    }
}

impl ReportSink for XlsxSink {
    fn sink_id(&self) -> &str {
        "xlsx"
    }

    fn write(
        &self,
        report: &Report,
        layout: &ReportLayout,
        output: &Path,
    ) -> Result<(), SinkError> {
        let header = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
        let wrap = Format::new().set_text_wrap();

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&layout.sheet_name)?;

        for (col, title) in layout.titles().into_iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, title, &header)?;
        }

        for (idx, record) in report.records().iter().enumerate() {
            let row = idx as u32 + 1;
            let cells = layout.columns.iter().zip(layout.cells(record));
            for (col, (column, cell)) in cells.enumerate() {
                Self::write_cell(
                    worksheet,
                    (row, col as u16),
                    cell,
                    record,
                    &column.title,
                    &wrap,
                )?;
            }
        }
        worksheet.autofit();

        let buffer = workbook.save_to_buffer()?;
        debug!(bytes = buffer.len(), rows = report.len(), "Rendered workbook");
        write_atomically(output, |w| Ok(w.write_all(&buffer)?))
    }
}
