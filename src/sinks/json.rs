use super::write_atomically;
use crate::model::{Cell, FieldValue, Report, ReportLayout};
use crate::traits::{ReportSink, SinkError};
use serde_json::{Map, Value};
use std::path::Path;

/// JSON sink: an array of objects keyed by header title.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSink;

fn cell_to_json(cell: Cell<'_>) -> Value {
    match cell {
        Cell::Value(FieldValue::Integer(i)) => Value::from(*i),
        Cell::Value(FieldValue::Float(f)) => Value::from(*f),
        other => other.render().map(Value::String).unwrap_or(Value::Null),
    }
}

impl ReportSink for JsonSink {
    fn sink_id(&self) -> &str {
        "json"
    }

    fn write(
        &self,
        report: &Report,
        layout: &ReportLayout,
        output: &Path,
    ) -> Result<(), SinkError> {
        let rows: Vec<Value> = report
            .records()
            .iter()
            .map(|record| {
                let object: Map<String, Value> = layout
                    .columns
                    .iter()
                    .zip(layout.cells(record))
                    .map(|(column, cell)| (column.title.clone(), cell_to_json(cell)))
                    .collect();
                Value::Object(object)
            })
            .collect();

        write_atomically(output, |w| {
            serde_json::to_writer_pretty(w, &rows)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileRecord, LayoutColumn};

    #[test]
    fn test_numbers_stay_numeric() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.json");
        let layout = ReportLayout::new(
            "Schema Analysis",
            vec![
                LayoutColumn::field("usecase_name"),
                LayoutColumn::field("rows"),
                LayoutColumn::field("columns_mb"),
                LayoutColumn::field("partitions"),
            ],
        );
        let mut report = Report::new(layout.field_names());
        report
            .push(
                FileRecord::new("usecase_1")
                    .with("usecase_name", FieldValue::text("usecase_1"))
                    .with("rows", FieldValue::Integer(1200))
                    .with("columns_mb", FieldValue::Float(2.5))
                    .with("partitions", FieldValue::Missing),
            )
            .unwrap();

        JsonSink.write(&report, &layout, &output).unwrap();

        let parsed: Value = serde_json::from_slice(&std::fs::read(&output).unwrap()).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!([{
                "usecase_name": "usecase_1",
                "rows": 1200,
                "columns_mb": 2.5,
                "partitions": null
            }])
        );
    }
}
