//! Synthetic `jethro-metadata` trees for exercising the schema report.
//!
//! Layout produced under the output directory:
//!
//! ```text
//! jethro-metadata/
//!   e1/
//!   e2/
//!   e3/
//!     usecase_1/
//!       tables.ddl_<YYYYMMDD>.txt
//!       tables_metadata_info.txt
//!     ...
//!     usecase_10/
//! ```

use crate::harvest::formats::schema::{DDL_PREFIX, METADATA_FILE, USECASE_PREFIX};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ROOT_DIR: &str = "jethro-metadata";
const ENVIRONMENTS: [&str; 3] = ["e1", "e2", "e3"];
const USECASE_ENV: &str = "e3";
const USECASE_COUNT: usize = 10;

const COLUMN_TYPES: [&str; 8] = [
    "STRING",
    "INT",
    "FLOAT",
    "BOOLEAN",
    "TIMESTAMP",
    "DATE",
    "CHAR",
    "VARCHAR(255)",
];

const METADATA_HEADER: &str = "ID | Schema Name | Table Name    | Column Name | Rows   | Partitions| Columns-MB  | Indexes-MB  | Keys-MB  | Guki-MB  | Table Type ";

fn border() -> String {
    "-".repeat(133)
}

/// Writes randomized usecase folders; a fixed seed reproduces the same tree.
pub struct FixtureGenerator<R: Rng> {
    rng: R,
    date_stamp: String,
}

impl FixtureGenerator<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> FixtureGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            date_stamp: chrono::Local::now().format("%Y%m%d").to_string(),
        }
    }

    /// Overrides the date embedded in DDL file names.
    pub fn with_date_stamp(mut self, stamp: impl Into<String>) -> Self {
        self.date_stamp = stamp.into();
        self
    }

    /// Creates the tree under `out` and returns the usecase folders.
    pub fn generate(&mut self, out: &Path) -> io::Result<Vec<PathBuf>> {
        let base = out.join(ROOT_DIR);
        for env in ENVIRONMENTS {
            fs::create_dir_all(base.join(env))?;
        }

        let mut usecases = Vec::with_capacity(USECASE_COUNT);
        for i in 1..=USECASE_COUNT {
            let dir = base.join(USECASE_ENV).join(format!("{USECASE_PREFIX}{i}"));
            fs::create_dir_all(&dir)?;
            self.write_usecase(&dir)?;
            usecases.push(dir);
        }

        info!(root = %base.display(), usecases = usecases.len(), "Synthetic tree written");
        Ok(usecases)
    }

    fn write_usecase(&mut self, dir: &Path) -> io::Result<()> {
        let table_count = self.rng.gen_range(3..=10);
        let tables: Vec<String> = (0..table_count)
            .map(|_| format!("table_{}", self.rng.gen_range(1..=100)))
            .collect();
        let schema = format!("schema_{}", self.rng.gen_range(1..=300));

        let ddl_name = format!("{DDL_PREFIX}{}.txt", self.date_stamp);
        fs::write(dir.join(&ddl_name), self.ddl_content(&schema, &tables))?;
        fs::write(dir.join(METADATA_FILE), self.metadata_content(&schema, &tables))?;

        debug!(dir = %dir.display(), schema = %schema, tables = table_count, "Usecase written");
        Ok(())
    }

    fn ddl_content(&mut self, schema: &str, tables: &[String]) -> String {
        tables
            .iter()
            .map(|table| {
                let columns: Vec<String> = (0..self.rng.gen_range(2..=5))
                    .map(|_| {
                        let ty = COLUMN_TYPES.choose(&mut self.rng).copied().unwrap_or("STRING");
                        format!("col_{} {ty}", self.rng.gen_range(1..=100))
                    })
                    .collect();
                format!("use {schema};\nCREATE TABLE {table} ({});\n;", columns.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn metadata_content(&mut self, schema: &str, tables: &[String]) -> String {
        let row_count = self.rng.gen_range(2..=6);
        let mut content = format!("{METADATA_HEADER}\n{}\n", border());

        for i in 1..=row_count {
            let table = tables.choose(&mut self.rng).map(String::as_str).unwrap_or("table_1");
            content.push_str(&format!(
                "{i:<3}| {schema:<13}| {table:<13}| col_{:<11}| {:<7}| {:<10}| {:<11.2}| {:<11.2}| {:<8.2}| {:<8.2}| Managed  \n",
                self.rng.gen_range(1..=100),
                self.rng.gen_range(1000..=100_000),
                self.rng.gen_range(1..=50),
                self.rng.gen_range(0.1..10.0),
                self.rng.gen_range(0.01..1.0),
                self.rng.gen_range(0.01..1.0),
                self.rng.gen_range(0.01..1.0),
            ));
        }

        content.push_str(&border());
        content.push('\n');
        content.push_str(&format!(
            "Total query time: {}\n\nRow count: {row_count}",
            self.rng.gen_range(1..=500)
        ));
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::formats::schema::{parse_ddl, parse_metadata};

    #[test]
    fn test_generates_expected_layout() {
        let dir = tempfile::tempdir().unwrap();
        let usecases = FixtureGenerator::seeded(7)
            .with_date_stamp("20240101")
            .generate(dir.path())
            .unwrap();

        assert_eq!(usecases.len(), 10);
        for env in ENVIRONMENTS {
            assert!(dir.path().join(ROOT_DIR).join(env).is_dir());
        }
        for usecase in &usecases {
            assert!(usecase.join("tables.ddl_20240101.txt").is_file());
            assert!(usecase.join(METADATA_FILE).is_file());
        }
    }

    #[test]
    fn test_generated_files_parse() {
        let dir = tempfile::tempdir().unwrap();
        let usecases = FixtureGenerator::seeded(42).generate(dir.path()).unwrap();

        for usecase in usecases {
            let ddl_file = fs::read_dir(&usecase)
                .unwrap()
                .map(|e| e.unwrap().path())
                .find(|p| p.file_name().unwrap().to_string_lossy().starts_with(DDL_PREFIX))
                .unwrap();
            let ddl = parse_ddl(&fs::read_to_string(ddl_file).unwrap());
            assert!((3..=10).contains(&ddl.len()));

            let metadata = parse_metadata(&fs::read_to_string(usecase.join(METADATA_FILE)).unwrap());
            // first row lands in the header slot
            assert!((1..=5).contains(&metadata.len()));
            let schema = &ddl[0].schema_name;
            assert!(metadata.iter().all(|m| &m.schema_name == schema));
            assert!(metadata
                .iter()
                .all(|m| ddl.iter().any(|d| d.table_name == m.table_name)));
        }
    }

    #[test]
    fn test_same_seed_same_tree() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let first = FixtureGenerator::seeded(3).with_date_stamp("20240101").generate(a.path()).unwrap();
        let second = FixtureGenerator::seeded(3).with_date_stamp("20240101").generate(b.path()).unwrap();

        for (x, y) in first.iter().zip(&second) {
            assert_eq!(
                fs::read_to_string(x.join(METADATA_FILE)).unwrap(),
                fs::read_to_string(y.join(METADATA_FILE)).unwrap()
            );
        }
    }
}
