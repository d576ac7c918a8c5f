//! Python source analysis: sizes, declarations, embedded SQL and schedules.

use crate::harvest::rules::{self, ClassRule, Classifier};
use crate::harvest::traits::{AnalysisError, SourceFormat};
use crate::model::{FieldValue, FileRecord, LayoutColumn, ReportLayout};
use crate::walker::EntryFilter;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

/// Cell text of a file without a schedule expression.
pub const UNKNOWN_SCHEDULE: &str = "N/A";

/// Fill text of columns no rule extracts.
const PLACEHOLDER: &str = "Unknown";

/// More statements than this raise complexity to `High`.
pub const QUERY_THRESHOLD: usize = 3;

/// More imports (or function definitions) than this raise complexity to `Very High`.
pub const NAME_THRESHOLD: usize = 5;

static SCHEDULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2} \d{1,2} \d{1,2} \d{1,2} \d{1,2} \S+)").expect("schedule pattern")
});
static SQL_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(SELECT.*?;|INSERT INTO.*?;|UPDATE.*?;|DELETE FROM.*?;)")
        .expect("sql pattern")
});
static TABLE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"FROM (\w+)|INTO (\w+)|JOIN (\w+)").expect("table pattern"));
static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:import|from)\s+([a-zA-Z0-9_]+)").expect("import pattern")
});
static FUNCTION_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*def\s+([a-zA-Z0-9_]+)\s*\(").expect("function pattern")
});
static CLASS_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*class\s+([A-Za-z_][A-Za-z0-9_]*)").expect("class pattern")
});
static DEF_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*def\s+[A-Za-z_]").expect("def line pattern"));
static CLASS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*class\s+[A-Za-z_]").expect("class line pattern"));
static CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\w+)\s*\(").expect("call pattern"));
static DOCSTRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)"""(.*?)""""#).expect("docstring pattern"));
static LOOP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:for|while)\s+\w+").expect("loop pattern"));
static CONDITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bif\s+.*:").expect("condition pattern"));

/// First schedule-like expression of a file (`m h dom mon dow cmd`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    Expression(String),
    Unknown,
}

impl Schedule {
    pub fn extract(code: &str) -> Self {
        match rules::first_match(&SCHEDULE, code) {
            Some(expr) => Schedule::Expression(expr.to_string()),
            None => Schedule::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Schedule::Expression(expr) => expr,
            Schedule::Unknown => UNKNOWN_SCHEDULE,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Schedule::Expression(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Complexity {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "Low",
            Complexity::Medium => "Medium",
            Complexity::High => "High",
            Complexity::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs of the complexity decision table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexitySignals {
    pub has_schedule: bool,
    pub query_count: usize,
    pub import_count: usize,
    pub function_count: usize,
}

fn has_schedule(s: &ComplexitySignals) -> bool {
    s.has_schedule
}

fn many_queries(s: &ComplexitySignals) -> bool {
    s.query_count > QUERY_THRESHOLD
}

fn many_names(s: &ComplexitySignals) -> bool {
    s.import_count > NAME_THRESHOLD || s.function_count > NAME_THRESHOLD
}

/// `Low`, then `Medium` / `High` / `Very High` as each check holds, in that order.
pub fn complexity_classifier() -> Classifier<ComplexitySignals, Complexity> {
    Classifier::new(
        Complexity::Low,
        vec![
            ClassRule {
                applies: has_schedule,
                level: Complexity::Medium,
            },
            ClassRule {
                applies: many_queries,
                level: Complexity::High,
            },
            ClassRule {
                applies: many_names,
                level: Complexity::VeryHigh,
            },
        ],
    )
}

fn count_declarations(pattern: &Regex, code: &str) -> usize {
    rules::split_lines(code)
        .into_iter()
        .filter(|line| pattern.is_match(line))
        .count()
}

/// Everything extracted from one Python file.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeFacts {
    pub lines_of_code: usize,
    pub class_count: usize,
    pub function_count: usize,
    pub imports: Vec<String>,
    pub function_names: Vec<String>,
    pub class_names: Vec<String>,
    pub schedule: Schedule,
    pub sql_queries: Vec<String>,
    pub table_names: Vec<String>,
    pub query_length: usize,
    pub complexity: Complexity,
    pub call_count: usize,
    pub docstring_count: usize,
    pub loop_count: usize,
    pub condition_count: usize,
}

impl CodeFacts {
    pub fn extract(code: &str) -> Self {
        Self::extract_with(code, &complexity_classifier())
    }

    pub fn extract_with(
        code: &str,
        classifier: &Classifier<ComplexitySignals, Complexity>,
    ) -> Self {
        let schedule = Schedule::extract(code);
        let sql_queries = rules::all_matches(&SQL_STATEMENT, code);
        let table_names = rules::derive_list(&sql_queries, &TABLE_REF);
        let query_length = rules::total_length(&sql_queries);
        let imports = rules::all_matches(&IMPORT, code);
        let function_names = rules::all_matches(&FUNCTION_DEF, code);

        let complexity = classifier.classify(&ComplexitySignals {
            has_schedule: schedule.is_known(),
            query_count: sql_queries.len(),
            import_count: imports.len(),
            function_count: function_names.len(),
        });

        Self {
            lines_of_code: rules::count_lines(code),
            class_count: count_declarations(&CLASS_LINE, code),
            function_count: count_declarations(&DEF_LINE, code),
            class_names: rules::all_matches(&CLASS_DEF, code),
            imports,
            function_names,
            schedule,
            sql_queries,
            table_names,
            query_length,
            complexity,
            call_count: rules::count_matches(&CALL, code),
            docstring_count: rules::count_matches(&DOCSTRING, code),
            loop_count: rules::count_matches(&LOOP, code),
            condition_count: rules::count_matches(&CONDITION, code),
        }
    }

    /// `Imports: a, b` and `Functions: f, g` on two lines.
    pub fn dependencies_summary(&self) -> String {
        format!(
            "Imports: {}\nFunctions: {}",
            self.imports.join(", "),
            self.function_names.join(", ")
        )
    }

    pub fn into_record(self, file_name: &str) -> FileRecord {
        let dependencies = self.dependencies_summary();
        FileRecord::new(file_name)
            .with("file_name", FieldValue::text(file_name))
            .with("type", FieldValue::text("Python"))
            .with("lines_of_code", FieldValue::from_count(self.lines_of_code))
            .with("class_count", FieldValue::from_count(self.class_count))
            .with("function_count", FieldValue::from_count(self.function_count))
            .with("query_count", FieldValue::from_count(self.sql_queries.len()))
            .with("dependencies", FieldValue::Text(dependencies))
            .with("imports", FieldValue::comma_list(self.imports))
            .with("function_names", FieldValue::comma_list(self.function_names))
            .with("class_names", FieldValue::comma_list(self.class_names))
            .with("cron_expression", FieldValue::text(self.schedule.as_str()))
            .with("sql_queries", FieldValue::line_list(self.sql_queries))
            .with("table_names", FieldValue::comma_list(self.table_names))
            .with("query_length", FieldValue::from_count(self.query_length))
            .with("complexity", FieldValue::text(self.complexity.as_str()))
            .with("call_count", FieldValue::from_count(self.call_count))
            .with("docstring_count", FieldValue::from_count(self.docstring_count))
            .with("loop_count", FieldValue::from_count(self.loop_count))
            .with("condition_count", FieldValue::from_count(self.condition_count))
    }
}

/// `.py` files, one record each.
#[derive(Default)]
pub struct PythonFormat;

impl SourceFormat for PythonFormat {
    fn name(&self) -> &str {
        "code"
    }

    fn entry_filter(&self) -> EntryFilter {
        EntryFilter::suffix(".py")
    }

    fn layout(&self) -> ReportLayout {
        ReportLayout::new(
            "Code Analysis",
            vec![
                LayoutColumn::field("file_name"),
                LayoutColumn::field("type"),
                LayoutColumn::field("lines_of_code"),
                LayoutColumn::field("class_count"),
                LayoutColumn::field("function_count"),
                LayoutColumn::field("query_count"),
                LayoutColumn::placeholder("purpose", PLACEHOLDER),
                LayoutColumn::field("dependencies"),
                LayoutColumn::placeholder("triggers", PLACEHOLDER),
                LayoutColumn::placeholder("sources", PLACEHOLDER),
                LayoutColumn::placeholder("sinks", PLACEHOLDER),
                LayoutColumn::field("imports"),
                LayoutColumn::field("function_names"),
                LayoutColumn::field("class_names"),
                LayoutColumn::field("cron_expression"),
                LayoutColumn::field("sql_queries"),
                LayoutColumn::renamed("input/output_table_names", "table_names"),
                LayoutColumn::field("query_length"),
                LayoutColumn::field("complexity"),
                LayoutColumn::field("call_count"),
                LayoutColumn::field("docstring_count"),
                LayoutColumn::field("loop_count"),
                LayoutColumn::field("condition_count"),
            ],
        )
    }

    fn analyze(&self, path: &Path) -> Result<Vec<FileRecord>, AnalysisError> {
        let code = std::fs::read_to_string(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(vec![CodeFacts::extract(&code).into_record(&file_name)])
    }
}
