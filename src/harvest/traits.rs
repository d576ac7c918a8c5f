//! Core traits and types for the harvest system.
//!
//! - Format-specific extraction via [`SourceFormat`]
//! - Standardized per-unit error handling via [`AnalysisError`]

use crate::model::{FileRecord, ReportLayout};
use crate::walker::EntryFilter;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Source Format Trait
// ============================================================================

/// Abstraction for one kind of input (Python sources, XML job descriptors,
/// schema dumps).
///
/// Each supported kind implements this trait to provide:
/// - The walker filter selecting its input files
/// - The fixed report layout its records follow
/// - Per-unit extraction into [`FileRecord`]s
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; they hold only compiled patterns and
/// constants.
pub trait SourceFormat: Send + Sync {
    /// Returns the unique identifier for this format.
    ///
    /// Examples: `"code"`, `"xml"`, `"schema"`
    fn name(&self) -> &str;

    /// Filter the directory walker applies to select candidate files.
    fn entry_filter(&self) -> EntryFilter;

    /// Header list of the report this format produces.
    ///
    /// Every record returned by [`SourceFormat::analyze`] carries exactly the
    /// layout's field-bound columns, in order.
    fn layout(&self) -> ReportLayout;

    /// Second-level check on a path the filter accepted.
    ///
    /// Default implementation accepts everything.
    fn can_handle(&self, _path: &Path) -> bool {
        true
    }

    /// Extracts the records of one unit.
    ///
    /// An extraction rule that finds nothing is not an error; it yields a
    /// sentinel or empty value. An empty `Vec` means the unit contributed no
    /// rows.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if the unit cannot be read or its structure
    /// cannot be parsed. The error is scoped to this unit only.
    fn analyze(&self, path: &Path) -> Result<Vec<FileRecord>, AnalysisError>;
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while extracting one unit.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Unit could not be read
    #[error("I/O error during analysis: {0}")]
    Io(#[from] std::io::Error),

    /// XML document is malformed
    #[error("XML parsing failed: {0}")]
    XmlParsing(#[from] roxmltree::Error),

    /// A required companion file is absent from the unit's folder
    #[error("Missing companion file '{pattern}' in {}", dir.display())]
    MissingCompanion { dir: PathBuf, pattern: String },
}
