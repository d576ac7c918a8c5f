//! Sequential harvest pipeline executor.
//!
//! This module provides the [`HarvestPipeline`] coordinator that runs the
//! harvest stages (Walker → Extractor → Aggregator → Writer) with:
//! - A lazy directory walk feeding one unit at a time
//! - Per-unit error isolation (a failed unit is logged and skipped)
//! - An explicit fold building the [`Report`]
//! - Structured logging via `tracing`

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::harvest::traits::{AnalysisError, SourceFormat};
use crate::model::{Report, SchemaMismatch};
use crate::traits::{ReportSink, SinkError};
use crate::walker::{DirectoryWalker, WalkError};

// ============================================================================
// Pipeline Types
// ============================================================================

/// Complete harvest result with the report and statistics.
#[derive(Debug)]
pub struct HarvestResult {
    /// Aggregated report, as handed to the sink
    pub report: Report,

    /// Path of the written artifact.
    ///
    /// `None` when no unit produced a row; no artifact is written then.
    pub output_path: Option<PathBuf>,

    /// Processing statistics
    pub stats: HarvestStats,
}

/// Statistics about the harvest operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HarvestStats {
    /// Total time spent on entire harvest (milliseconds)
    pub total_duration_ms: u64,

    /// Time spent walking and extracting (milliseconds)
    pub extraction_duration_ms: u64,

    /// Time spent writing the report (milliseconds)
    pub write_duration_ms: u64,

    /// Files yielded by the walker
    pub units_seen: usize,

    /// Units that extracted successfully (possibly with zero rows)
    pub units_extracted: usize,

    /// Units rejected by the format or that failed extraction
    pub units_skipped: usize,

    /// Rows in the final report
    pub rows: usize,
}

// ============================================================================
// Pipeline Errors
// ============================================================================

/// Fatal errors; per-unit failures never surface here.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Input root missing or unusable
    #[error("Walk failed: {0}")]
    Walk(#[from] WalkError),

    /// A format produced a record outside its own layout
    #[error("Aggregation failed: {0}")]
    Schema(#[from] SchemaMismatch),

    /// Report could not be written
    #[error("Report write failed: {0}")]
    Sink(#[from] SinkError),
}

// ============================================================================
// Pipeline Executor
// ============================================================================

/// Harvest pipeline for one source format and one report sink.
///
/// The pipeline runs strictly in sequence:
/// 1. **Walk**: enumerate files under the root matching the format's filter
/// 2. **Extract**: analyze each unit into records
/// 3. **Aggregate**: fold records into one [`Report`]
/// 4. **Write**: hand the report to the sink, once
///
/// # Example
///
/// ```ignore
/// use artifact_harvester::harvest::formats::PythonFormat;
/// use artifact_harvester::harvest::HarvestPipeline;
/// use artifact_harvester::sinks::XlsxSink;
///
/// let pipeline = HarvestPipeline::new(PythonFormat, XlsxSink).with_max_depth(Some(3));
/// let result = pipeline.execute("src".as_ref(), "code_analysis_output.xlsx".as_ref())?;
/// println!("Wrote {} rows", result.stats.rows);
/// ```
pub struct HarvestPipeline<F, S>
where
    F: SourceFormat,
    S: ReportSink,
{
    /// Extraction stage implementation
    format: F,

    /// Writer stage implementation
    sink: S,

    /// Recursion limit for the walk (default: unlimited)
    max_depth: Option<usize>,
}

impl<F, S> HarvestPipeline<F, S>
where
    F: SourceFormat,
    S: ReportSink,
{
    /// Creates a new pipeline with the given format and sink.
    ///
    /// Default configuration:
    /// - Walk depth: unlimited
    pub fn new(format: F, sink: S) -> Self {
        Self {
            format,
            sink,
            max_depth: None,
        }
    }

    /// Limits how deep the walker recurses below the root.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Walks, extracts and aggregates without writing anything.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the root is missing or a record does not
    /// match the format's layout.
    pub fn collect(&self, root: &Path) -> Result<(Report, HarvestStats), PipelineError> {
        let layout = self.format.layout();
        let mut walk = DirectoryWalker::new(root, self.format.entry_filter())
            .with_max_depth(self.max_depth)
            .walk()?;

        info!(
            format = self.format.name(),
            root = %root.display(),
            "Starting walk"
        );

        let (report, mut stats) = walk.try_fold(
            (Report::new(layout.field_names()), HarvestStats::default()),
            |acc, path| self.fold_unit(acc, &path),
        )?;
        stats.rows = report.len();
        Ok((report, stats))
    }

    /// Aggregator step: one unit in, the grown report out.
    fn fold_unit(
        &self,
        (mut report, mut stats): (Report, HarvestStats),
        path: &Path,
    ) -> Result<(Report, HarvestStats), PipelineError> {
        stats.units_seen += 1;

        if !self.format.can_handle(path) {
            stats.units_skipped += 1;
            warn!(path = %path.display(), format = self.format.name(), "Skipping unit outside format scope");
            return Ok((report, stats));
        }

        match self.format.analyze(path) {
            Ok(records) => {
                stats.units_extracted += 1;
                info!(path = %path.display(), rows = records.len(), "Extracted unit");
                for record in records {
                    report.push(record)?;
                }
            }
            Err(e @ AnalysisError::MissingCompanion { .. }) => {
                stats.units_skipped += 1;
                warn!(path = %path.display(), error = %e, "Skipping incomplete unit");
            }
            Err(e) => {
                stats.units_skipped += 1;
                error!(path = %path.display(), error = %e, "Error processing unit");
            }
        }

        Ok((report, stats))
    }

    /// Executes the complete harvest pipeline and writes the report.
    ///
    /// # Arguments
    ///
    /// * `root` - Directory to scan
    /// * `output` - Report destination; written only if at least one row exists
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if:
    /// - The root does not exist
    /// - The sink fails to write the report (nothing is left at `output`)
    pub fn execute(&self, root: &Path, output: &Path) -> Result<HarvestResult, PipelineError> {
        let start = Instant::now();

        let (report, mut stats) = self.collect(root)?;
        stats.extraction_duration_ms = start.elapsed().as_millis() as u64;

        info!(
            duration_ms = stats.extraction_duration_ms,
            units = stats.units_seen,
            extracted = stats.units_extracted,
            skipped = stats.units_skipped,
            rows = stats.rows,
            "Extraction completed"
        );

        if report.is_empty() {
            warn!(format = self.format.name(), root = %root.display(), "No data found, no report written");
            stats.total_duration_ms = start.elapsed().as_millis() as u64;
            return Ok(HarvestResult {
                report,
                output_path: None,
                stats,
            });
        }

        let write_start = Instant::now();
        self.sink.write(&report, &self.format.layout(), output)?;
        stats.write_duration_ms = write_start.elapsed().as_millis() as u64;
        stats.total_duration_ms = start.elapsed().as_millis() as u64;

        info!(
            sink = self.sink.sink_id(),
            output = %output.display(),
            rows = stats.rows,
            duration_ms = stats.write_duration_ms,
            "Report written"
        );

        Ok(HarvestResult {
            report,
            output_path: Some(output.to_path_buf()),
            stats,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldValue, FileRecord, LayoutColumn, ReportLayout};
    use crate::walker::EntryFilter;
    use std::sync::Mutex;

    // Mock format: one record per `.txt` file holding its byte count
    struct MockFormat;

    impl SourceFormat for MockFormat {
        fn name(&self) -> &str {
            "mock"
        }

        fn entry_filter(&self) -> EntryFilter {
            EntryFilter::suffix(".txt")
        }

        fn layout(&self) -> ReportLayout {
            ReportLayout::new(
                "Mock",
                vec![LayoutColumn::field("name"), LayoutColumn::field("size")],
            )
        }

        fn can_handle(&self, path: &Path) -> bool {
            !path.to_string_lossy().contains("ignored")
        }

        fn analyze(&self, path: &Path) -> Result<Vec<FileRecord>, AnalysisError> {
            let content = std::fs::read_to_string(path)?;
            if content.starts_with("broken") {
                return Err(AnalysisError::Io(std::io::Error::other("broken unit")));
            }
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            Ok(vec![FileRecord::new(name.clone())
                .with("name", FieldValue::text(name))
                .with("size", FieldValue::from_count(content.len()))])
        }
    }

    // Mock sink remembering what it was asked to write
    #[derive(Default)]
    struct MockSink {
        written: Mutex<Vec<(usize, PathBuf)>>,
    }

    impl ReportSink for MockSink {
        fn sink_id(&self) -> &str {
            "mock"
        }

        fn write(
            &self,
            report: &Report,
            _layout: &ReportLayout,
            output: &Path,
        ) -> Result<(), SinkError> {
            self.written
                .lock()
                .unwrap()
                .push((report.len(), output.to_path_buf()));
            Ok(())
        }
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.txt"), "aaa").unwrap();
        std::fs::write(dir.path().join("b.txt"), "broken").unwrap();
        std::fs::write(dir.path().join("ignored.txt"), "zz").unwrap();
        std::fs::write(dir.path().join("sub/c.txt"), "c").unwrap();
        std::fs::write(dir.path().join("skip.md"), "no").unwrap();
        dir
    }

    #[test]
    fn test_pipeline_execution() {
        let dir = fixture();
        let pipeline = HarvestPipeline::new(MockFormat, MockSink::default());

        let output = dir.path().join("out.mock");
        let result = pipeline.execute(dir.path(), &output).unwrap();

        let names: Vec<&str> = result.report.records().iter().map(|r| r.identifier()).collect();
        assert_eq!(names, vec!["a.txt", "c.txt"]);
        assert_eq!(result.output_path.as_deref(), Some(output.as_path()));
        assert_eq!(
            *pipeline.sink.written.lock().unwrap(),
            vec![(2, output.clone())]
        );
    }

    #[test]
    fn test_pipeline_stats() {
        let dir = fixture();
        let pipeline = HarvestPipeline::new(MockFormat, MockSink::default());
        let (_, stats) = pipeline.collect(dir.path()).unwrap();

        assert_eq!(stats.units_seen, 4);
        assert_eq!(stats.units_extracted, 2);
        assert_eq!(stats.units_skipped, 2);
        assert_eq!(stats.rows, 2);
    }

    #[test]
    fn test_pipeline_with_max_depth() {
        let dir = fixture();
        let pipeline = HarvestPipeline::new(MockFormat, MockSink::default()).with_max_depth(Some(1));
        let (report, _) = pipeline.collect(dir.path()).unwrap();
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_empty_result_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = HarvestPipeline::new(MockFormat, MockSink::default());

        let result = pipeline
            .execute(dir.path(), &dir.path().join("out.mock"))
            .unwrap();

        assert!(result.output_path.is_none());
        assert!(result.report.is_empty());
        assert!(pipeline.sink.written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = HarvestPipeline::new(MockFormat, MockSink::default());
        let err = pipeline
            .execute(&dir.path().join("absent"), &dir.path().join("out.mock"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Walk(WalkError::RootNotFound(_))));
    }
}
