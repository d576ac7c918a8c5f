//! Harvest module - modular extraction and report pipeline.
//!
//! This module provides the core abstractions of the harvester:
//! - **Traits**: [`SourceFormat`] for plugging in one kind of input
//! - **Rules**: stateless regex rules and the ordered [`rules::Classifier`]
//! - **Parsers**: markup tree lookups and fixed-width tables
//! - **Pipeline**: sequential executor via [`pipeline::HarvestPipeline`]

pub mod fixed_width;
pub mod formats;
pub mod pipeline;
pub mod rules;
pub mod traits;
pub mod tree;

// Re-export commonly used types
pub use traits::{AnalysisError, SourceFormat};

pub use pipeline::{HarvestPipeline, HarvestResult, HarvestStats, PipelineError};
