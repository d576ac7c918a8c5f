//! Source format implementations.
//!
//! Each module implements [`SourceFormat`](crate::harvest::SourceFormat) for
//! one kind of input:
//! - `python` - Python sources (sizes, declarations, SQL, schedules)
//! - `job_xml` - XML job descriptors (command and target table)
//! - `schema` - usecase folders joining DDL dumps with metadata reports

pub mod job_xml;
pub mod python;
pub mod schema;

pub use job_xml::JobXmlFormat;
pub use python::PythonFormat;
pub use schema::SchemaFormat;
