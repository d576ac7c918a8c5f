//! Schema dumps: joins DDL statements with table metadata reports per usecase folder.
//!
//! A usecase folder holds a `tables.ddl_<date>.txt` dump and a
//! `tables_metadata_info.txt` fixed-width report. Rows are produced only for
//! tables present in both.

use crate::harvest::fixed_width;
use crate::harvest::traits::{AnalysisError, SourceFormat};
use crate::model::{FieldValue, FileRecord, LayoutColumn, ReportLayout};
use crate::walker::EntryFilter;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

pub const METADATA_FILE: &str = "tables_metadata_info.txt";
pub const DDL_PREFIX: &str = "tables.ddl_";
pub const USECASE_PREFIX: &str = "usecase_";

/// Columns of a metadata report row.
const METADATA_WIDTH: usize = 11;

static CREATE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)use\s+(\w+);\n(CREATE\s+TABLE\s+(\w+).*?;)").expect("ddl pattern")
});

/// One `use SCHEMA; CREATE TABLE ...;` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlTable {
    pub schema_name: String,
    pub table_name: String,
    pub type_of_query: String,
    pub no_of_queries: i64,
    pub query_length: i64,
}

/// One row of the metadata report; unparseable numbers are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMetadata {
    pub id: Option<i64>,
    pub schema_name: String,
    pub table_name: String,
    pub column_name: String,
    pub rows: Option<i64>,
    pub partitions: Option<i64>,
    pub columns_mb: Option<f64>,
    pub indexes_mb: Option<f64>,
    pub keys_mb: Option<f64>,
    pub guki_mb: Option<f64>,
    pub table_type: String,
}

/// One entry per `use`/`CREATE TABLE` pair.
///
/// `query_length` is the length of that entry's own statement; entries never
/// share the length of the first statement in the file.
pub fn parse_ddl(text: &str) -> Vec<DdlTable> {
    CREATE_TABLE
        .captures_iter(text)
        .map(|caps| DdlTable {
            schema_name: caps[1].to_lowercase(),
            table_name: caps[3].to_lowercase(),
            type_of_query: "CREATE".to_string(),
            no_of_queries: 1,
            query_length: caps[2].chars().count() as i64,
        })
        .collect()
}

pub fn parse_metadata(text: &str) -> Vec<TableMetadata> {
    fixed_width::parse_rows(text, METADATA_WIDTH)
        .into_iter()
        .map(|f| TableMetadata {
            id: f[0].parse().ok(),
            schema_name: f[1].to_lowercase(),
            table_name: f[2].to_lowercase(),
            column_name: f[3].clone(),
            rows: f[4].parse().ok(),
            partitions: f[5].parse().ok(),
            columns_mb: f[6].parse().ok(),
            indexes_mb: f[7].parse().ok(),
            keys_mb: f[8].parse().ok(),
            guki_mb: f[9].parse().ok(),
            table_type: f[10].clone(),
        })
        .collect()
}

/// Inner join on (schema, table), in DDL order then metadata order.
pub fn join<'a>(
    ddl: &'a [DdlTable],
    metadata: &'a [TableMetadata],
) -> Vec<(&'a DdlTable, &'a TableMetadata)> {
    ddl.iter()
        .flat_map(|d| {
            metadata
                .iter()
                .filter(move |m| {
                    m.schema_name.to_lowercase() == d.schema_name.to_lowercase()
                        && m.table_name.to_lowercase() == d.table_name.to_lowercase()
                })
                .map(move |m| (d, m))
        })
        .collect()
}

fn int_field(value: Option<i64>) -> FieldValue {
    value.map(FieldValue::Integer).unwrap_or(FieldValue::Missing)
}

fn float_field(value: Option<f64>) -> FieldValue {
    value.map(FieldValue::Float).unwrap_or(FieldValue::Missing)
}

fn joined_record(usecase: &str, ddl: &DdlTable, meta: &TableMetadata) -> FileRecord {
    FileRecord::new(usecase)
        .with("usecase_name", FieldValue::text(usecase))
        .with("schema_name", FieldValue::text(ddl.schema_name.as_str()))
        .with("table_name", FieldValue::text(ddl.table_name.as_str()))
        .with("type_of_query", FieldValue::text(ddl.type_of_query.as_str()))
        .with("no_of_queries", FieldValue::Integer(ddl.no_of_queries))
        .with("query_length", FieldValue::Integer(ddl.query_length))
        .with("id", int_field(meta.id))
        .with("column_name", FieldValue::text(meta.column_name.as_str()))
        .with("rows", int_field(meta.rows))
        .with("partitions", int_field(meta.partitions))
        .with("columns_mb", float_field(meta.columns_mb))
        .with("indexes_mb", float_field(meta.indexes_mb))
        .with("keys_mb", float_field(meta.keys_mb))
        .with("guki_mb", float_field(meta.guki_mb))
        .with("table_type", FieldValue::text(meta.table_type.as_str()))
}

fn folder_name(dir: &Path) -> Option<String> {
    dir.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Last `tables.ddl_*` file of the folder in name order.
fn find_ddl_file(dir: &Path) -> std::io::Result<Option<PathBuf>> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|e| e.file_name().to_string_lossy().starts_with(DDL_PREFIX))
        .map(|e| e.path())
        .collect();
    candidates.sort();
    Ok(candidates.pop())
}

/// Usecase folders, found through their metadata report.
#[derive(Default)]
pub struct SchemaFormat;

impl SourceFormat for SchemaFormat {
    fn name(&self) -> &str {
        "schema"
    }

    fn entry_filter(&self) -> EntryFilter {
        EntryFilter::exact(METADATA_FILE)
    }

    fn layout(&self) -> ReportLayout {
        ReportLayout::new(
            "Schema Analysis",
            [
                "usecase_name",
                "schema_name",
                "table_name",
                "type_of_query",
                "no_of_queries",
                "query_length",
                "id",
                "column_name",
                "rows",
                "partitions",
                "columns_mb",
                "indexes_mb",
                "keys_mb",
                "guki_mb",
                "table_type",
            ]
            .into_iter()
            .map(LayoutColumn::field)
            .collect(),
        )
    }

    fn can_handle(&self, path: &Path) -> bool {
        path.parent()
            .and_then(folder_name)
            .is_some_and(|name| name.starts_with(USECASE_PREFIX))
    }

    fn analyze(&self, path: &Path) -> Result<Vec<FileRecord>, AnalysisError> {
        let dir = path.parent().unwrap_or(Path::new("."));
        let usecase = folder_name(dir).unwrap_or_default();

        let ddl_path = find_ddl_file(dir)?.ok_or_else(|| AnalysisError::MissingCompanion {
            dir: dir.to_path_buf(),
            pattern: format!("{DDL_PREFIX}*"),
        })?;

        let ddl = parse_ddl(&std::fs::read_to_string(&ddl_path)?);
        let metadata = parse_metadata(&std::fs::read_to_string(path)?);
        debug!(
            usecase = %usecase,
            ddl_tables = ddl.len(),
            metadata_rows = metadata.len(),
            "Parsed usecase folder"
        );

        if ddl.is_empty() || metadata.is_empty() {
            info!(
                usecase = %usecase,
                ddl_tables = ddl.len(),
                metadata_rows = metadata.len(),
                "Skipping join: one side is empty"
            );
            return Ok(Vec::new());
        }

        Ok(join(&ddl, &metadata)
            .into_iter()
            .map(|(d, m)| joined_record(&usecase, d, m))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn ddl(schema: &str, table: &str) -> DdlTable {
        DdlTable {
            schema_name: schema.to_string(),
            table_name: table.to_string(),
            type_of_query: "CREATE".to_string(),
            no_of_queries: 1,
            query_length: 10,
        }
    }

    fn meta(id: i64, schema: &str, table: &str) -> TableMetadata {
        TableMetadata {
            id: Some(id),
            schema_name: schema.to_string(),
            table_name: table.to_string(),
            column_name: "col_1".to_string(),
            rows: Some(100),
            partitions: Some(2),
            columns_mb: Some(1.5),
            indexes_mb: Some(0.2),
            keys_mb: Some(0.1),
            guki_mb: None,
            table_type: "Managed".to_string(),
        }
    }

    const METADATA: &str = "\
ID | Schema Name | Table Name    | Column Name | Rows   | Partitions| Columns-MB  | Indexes-MB  | Keys-MB  | Guki-MB  | Table Type
-------------------------------------------------------------------------------------------------------------------------------------
1  | Schema_9     | table_1      | col_5       | 5000   | 3         | 2.50        | 0.10        | 0.20     | 0.30     | Managed
2  | schema_9     | Table_2      | col_6       | 6000   | x         | 1.25        | 0.50        | 0.40     | 0.90     | Managed
3  | schema_9     | table_3      | col_7       | 7000
-------------------------------------------------------------------------------------------------------------------------------------
Total query time: 12

Row count: 3";

    #[test]
    fn test_parse_ddl_lowercases_and_measures_each_statement() {
        let text = "use Sales;\nCREATE TABLE Orders (id INT, total FLOAT);\n;\nuse sales;\ncreate table items (sku STRING);\n;";
        let tables = parse_ddl(text);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].schema_name, "sales");
        assert_eq!(tables[0].table_name, "orders");
        assert_eq!(
            tables[0].query_length,
            "CREATE TABLE Orders (id INT, total FLOAT);".len() as i64
        );
        assert_eq!(tables[1].table_name, "items");
        assert_eq!(
            tables[1].query_length,
            "create table items (sku STRING);".len() as i64
        );
    }

    #[test]
    fn test_parse_metadata_skips_header_slot_and_coerces_numbers() {
        let rows = parse_metadata(METADATA);
        // Row 1 sits in the header slot after the border; row 3 is too short.
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.id, Some(2));
        assert_eq!(row.table_name, "table_2");
        assert_eq!(row.rows, Some(6000));
        assert_eq!(row.partitions, None);
        assert_eq!(row.columns_mb, Some(1.25));
        assert_eq!(row.table_type, "Managed");
    }

    #[test]
    fn test_join_is_inner_on_schema_and_table() {
        let left = vec![ddl("s1", "t1")];
        let right = vec![meta(1, "s1", "t1"), meta(2, "s1", "t2")];
        let joined = join(&left, &right);
        assert_eq!(joined.len(), 1);
        let (d, m) = joined[0];
        assert_eq!((d.schema_name.as_str(), d.table_name.as_str()), ("s1", "t1"));
        assert_eq!(m.id, Some(1));

        let record = joined_record("usecase_1", d, m);
        assert_eq!(record.get("query_length"), Some(&FieldValue::Integer(10)));
        assert_eq!(record.get("rows"), Some(&FieldValue::Integer(100)));
        assert_eq!(record.get("guki_mb"), Some(&FieldValue::Missing));
        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, SchemaFormat.layout().field_names());
    }

    #[test]
    fn test_join_keys_are_case_insensitive_and_pairwise() {
        let left = vec![ddl("S1", "T1"), ddl("s1", "t3")];
        let right = vec![meta(1, "s1", "t1"), meta(2, "s1", "t1"), meta(3, "s1", "t9")];
        let ids: Vec<Option<i64>> = join(&left, &right).iter().map(|(_, m)| m.id).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_analyze_usecase_folder() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("usecase_4");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("tables.ddl_20240101.txt"),
            "use schema_9;\nCREATE TABLE table_2 (c INT);\n;\nuse schema_9;\nCREATE TABLE table_8 (c INT);\n;",
        )
        .unwrap();
        fs::write(dir.join(METADATA_FILE), METADATA).unwrap();

        let format = SchemaFormat;
        let metadata_path = dir.join(METADATA_FILE);
        assert!(format.can_handle(&metadata_path));
        let records = format.analyze(&metadata_path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier(), "usecase_4");
        assert_eq!(
            records[0].get("table_name"),
            Some(&FieldValue::text("table_2"))
        );
    }

    #[test]
    fn test_empty_side_skips_folder() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("usecase_5");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("tables.ddl_20240101.txt"), "nothing here").unwrap();
        fs::write(dir.join(METADATA_FILE), METADATA).unwrap();

        let records = SchemaFormat.analyze(&dir.join(METADATA_FILE)).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_ddl_file_is_a_unit_error() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("usecase_6");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(METADATA_FILE), METADATA).unwrap();

        let err = SchemaFormat.analyze(&dir.join(METADATA_FILE)).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingCompanion { .. }));
    }

    #[test]
    fn test_only_usecase_folders_are_handled() {
        let format = SchemaFormat;
        assert!(format.can_handle(Path::new("repo/e3/usecase_1/tables_metadata_info.txt")));
        assert!(!format.can_handle(Path::new("repo/e3/tables_metadata_info.txt")));
    }
}
