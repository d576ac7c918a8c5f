use crate::harvest::formats::{JobXmlFormat, PythonFormat, SchemaFormat};
use crate::harvest::{HarvestPipeline, HarvestResult, PipelineError, SourceFormat};
use crate::sinks::sink_for_path;
use crate::traits::ReportSink;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Which report a job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Code,
    Xml,
    Schema,
}

impl JobKind {
    pub fn default_output(&self) -> &'static str {
        match self {
            JobKind::Code => "code_analysis_output.xlsx",
            JobKind::Xml => "extracted_details.xlsx",
            JobKind::Schema => "schema_analysis.xlsx",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobKind::Code => "code",
            JobKind::Xml => "xml",
            JobKind::Schema => "schema",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct HarvestJob {
    pub kind: JobKind,
    pub root: PathBuf,
    pub output: PathBuf,
    pub max_depth: Option<usize>,
}

impl HarvestJob {
    /// Job writing to the kind's default output in the working directory.
    pub fn new(kind: JobKind, root: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            root: root.into(),
            output: PathBuf::from(kind.default_output()),
            max_depth: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Runs harvest jobs end to end, one at a time.
#[derive(Debug, Default)]
pub struct HarvesterExecutor;

impl HarvesterExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Resolves the sink first so a bad output extension fails before any walk.
    #[instrument(skip(self), fields(kind = %job.kind, root = %job.root.display()))]
    pub fn execute(&self, job: &HarvestJob) -> Result<HarvestResult, PipelineError> {
        let sink = sink_for_path(&job.output)?;

        let result = match job.kind {
            JobKind::Code => self.run(PythonFormat, sink, job),
            JobKind::Xml => self.run(JobXmlFormat, sink, job),
            JobKind::Schema => self.run(SchemaFormat, sink, job),
        }?;

        info!(
            rows = result.stats.rows,
            skipped = result.stats.units_skipped,
            duration_ms = result.stats.total_duration_ms,
            "Finished harvest"
        );
        Ok(result)
    }

    fn run<F: SourceFormat>(
        &self,
        format: F,
        sink: Box<dyn ReportSink>,
        job: &HarvestJob,
    ) -> Result<HarvestResult, PipelineError> {
        HarvestPipeline::new(format, sink)
            .with_max_depth(job.max_depth)
            .execute(&job.root, &job.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SinkError;

    #[test]
    fn test_default_outputs() {
        let job = HarvestJob::new(JobKind::Schema, "/data");
        assert_eq!(job.output, PathBuf::from("schema_analysis.xlsx"));
        assert_eq!(JobKind::Code.default_output(), "code_analysis_output.xlsx");
        assert_eq!(JobKind::Xml.default_output(), "extracted_details.xlsx");
    }

    #[test]
    fn test_unsupported_output_fails_before_walk() {
        // root does not exist; the sink error must win
        let job = HarvestJob::new(JobKind::Code, "/definitely/not/here").with_output("out.txt");
        let err = HarvesterExecutor::new().execute(&job).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Sink(SinkError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_executes_xml_job_to_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("job.xml"),
            r#"<job><property name="cmd">/bin/load.sh x</property><property name="CMDL_TABLE_NAME">t</property></job>"#,
        )
        .unwrap();
        let output = dir.path().join("details.json");

        let job = HarvestJob::new(JobKind::Xml, dir.path()).with_output(&output);
        let result = HarvesterExecutor::new().execute(&job).unwrap();

        assert_eq!(result.stats.rows, 1);
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written[0]["Extracted File Name"], "load.sh");
        assert_eq!(written[0]["Extracted Table Name"], "t");
    }
}
