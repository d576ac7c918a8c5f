use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delimiter used when a list field is flattened into a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListDelimiter {
    /// `", "`, for short lists such as names.
    Comma,
    /// `"\n"`, for multi-line lists such as extracted statements.
    Newline,
}

impl ListDelimiter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListDelimiter::Comma => ", ",
            ListDelimiter::Newline => "\n",
        }
    }
}

/// A single cell value of a [`FileRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    List {
        items: Vec<String>,
        delimiter: ListDelimiter,
    },
    /// Value could not be parsed or was never present.
    Missing,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn comma_list(items: Vec<String>) -> Self {
        FieldValue::List {
            items,
            delimiter: ListDelimiter::Comma,
        }
    }

    pub fn line_list(items: Vec<String>) -> Self {
        FieldValue::List {
            items,
            delimiter: ListDelimiter::Newline,
        }
    }

    pub fn from_count(count: usize) -> Self {
        FieldValue::Integer(count as i64)
    }

    /// Flattens the value into the string a report cell shows.
    ///
    /// Returns `None` for [`FieldValue::Missing`].
    pub fn render(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Float(f) => Some(f.to_string()),
            FieldValue::List { items, delimiter } => Some(items.join(delimiter.as_str())),
            FieldValue::Missing => None,
        }
    }
}

/// One extracted row of facts about one input unit.
///
/// Built once through the `with` chain and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    identifier: String,
    fields: Vec<(String, FieldValue)>,
}

impl FileRecord {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            fields: Vec::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.push((name.into(), value));
        self
    }

    /// File or folder name this record describes.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

#[derive(Error, Debug)]
#[error("Record '{identifier}' does not match report schema: expected [{expected}], got [{actual}]")]
pub struct SchemaMismatch {
    pub identifier: String,
    pub expected: String,
    pub actual: String,
}

/// Ordered sequence of records sharing one fixed column schema.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    schema: Vec<String>,
    records: Vec<FileRecord>,
}

impl Report {
    pub fn new<I, S>(schema: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema: schema.into_iter().map(Into::into).collect(),
            records: Vec::new(),
        }
    }

    /// Appends a record, rejecting it if its fields differ from the schema.
    pub fn push(&mut self, record: FileRecord) -> Result<(), SchemaMismatch> {
        if !record.field_names().eq(self.schema.iter().map(String::as_str)) {
            return Err(SchemaMismatch {
                identifier: record.identifier().to_string(),
                expected: self.schema.join(", "),
                actual: record.field_names().collect::<Vec<_>>().join(", "),
            });
        }
        self.records.push(record);
        Ok(())
    }

    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Where a report column takes its cells from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSource {
    /// A named field of every record.
    Field(String),
    /// Not extracted; every cell holds the same fill text.
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutColumn {
    pub title: String,
    pub source: ColumnSource,
}

impl LayoutColumn {
    /// Column whose header title equals the field name.
    pub fn field(name: &str) -> Self {
        Self::renamed(name, name)
    }

    pub fn renamed(title: &str, field: &str) -> Self {
        Self {
            title: title.to_string(),
            source: ColumnSource::Field(field.to_string()),
        }
    }

    pub fn placeholder(title: &str, fill: &str) -> Self {
        Self {
            title: title.to_string(),
            source: ColumnSource::Placeholder(fill.to_string()),
        }
    }
}

/// Header list handed to a report sink, possibly wider than the record schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    pub sheet_name: String,
    pub columns: Vec<LayoutColumn>,
}

impl ReportLayout {
    pub fn new(sheet_name: &str, columns: Vec<LayoutColumn>) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            columns,
        }
    }

    /// Record schema implied by the layout: every field-bound column, in order.
    pub fn field_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter_map(|c| match &c.source {
                ColumnSource::Field(name) => Some(name.clone()),
                ColumnSource::Placeholder(_) => None,
            })
            .collect()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.title.as_str()).collect()
    }

    /// Resolves every column of the layout against one record.
    pub fn cells<'a>(&'a self, record: &'a FileRecord) -> Vec<Cell<'a>> {
        self.columns
            .iter()
            .map(|column| match &column.source {
                ColumnSource::Field(name) => match record.get(name) {
                    Some(value) => Cell::Value(value),
                    None => Cell::Empty,
                },
                ColumnSource::Placeholder(fill) => Cell::Fill(fill),
            })
            .collect()
    }
}

/// A resolved report cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Value(&'a FieldValue),
    Fill(&'a str),
    Empty,
}

impl Cell<'_> {
    pub fn render(&self) -> Option<String> {
        match self {
            Cell::Value(value) => value.render(),
            Cell::Fill(fill) => Some(fill.to_string()),
            Cell::Empty => None,
        }
    }
}
