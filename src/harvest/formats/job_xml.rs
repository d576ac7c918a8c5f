//! XML job descriptors: which command a job runs and which table it feeds.

use crate::harvest::traits::{AnalysisError, SourceFormat};
use crate::harvest::tree::{MarkupTree, TreeNode};
use crate::model::{FieldValue, FileRecord, LayoutColumn, ReportLayout};
use crate::walker::EntryFilter;
use std::path::Path;

const PROPERTY_TAG: &str = "property";
const NAME_ATTR: &str = "name";

/// Substring identifying the property that holds the command line.
const COMMAND_MARKER: &str = "cmd";

/// Property names holding the target table.
const TABLE_PROPERTIES: [&str; 2] = ["CMDL_TABLE_NAME", "MKT_TABLE_NAME"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobDetails {
    /// Full command line of the first `*cmd*` property.
    pub command_path: String,
    /// Base name of the command's first token.
    pub command_file: String,
    pub table_name: String,
}

fn text_of(node: Option<TreeNode<'_, '_>>) -> String {
    node.and_then(|n| n.trimmed_text())
        .unwrap_or_default()
        .to_string()
}

/// Base name of the first whitespace-delimited token, `""` for blank input.
fn command_file_name(command: &str) -> String {
    command
        .split_whitespace()
        .next()
        .and_then(|token| token.rsplit('/').next())
        .unwrap_or_default()
        .to_string()
}

impl JobDetails {
    /// Extracts details from a document; absent properties leave fields empty.
    pub fn extract(document: &str) -> Result<Self, roxmltree::Error> {
        let tree = MarkupTree::parse(document)?;

        let command_path = text_of(tree.find_first(PROPERTY_TAG, |n| {
            n.attr(NAME_ATTR)
                .is_some_and(|name| name.contains(COMMAND_MARKER))
        }));
        let table_name = text_of(tree.find_first(PROPERTY_TAG, |n| {
            n.attr(NAME_ATTR)
                .is_some_and(|name| TABLE_PROPERTIES.contains(&name))
        }));

        Ok(Self {
            command_file: command_file_name(&command_path),
            command_path,
            table_name,
        })
    }

    pub fn into_record(self, file_name: &str) -> FileRecord {
        FileRecord::new(file_name)
            .with("xml_file_name", FieldValue::text(file_name))
            .with("command_path", FieldValue::Text(self.command_path))
            .with("command_file", FieldValue::Text(self.command_file))
            .with("table_name", FieldValue::Text(self.table_name))
    }
}

/// `.xml` job descriptors, one record each.
#[derive(Default)]
pub struct JobXmlFormat;

impl SourceFormat for JobXmlFormat {
    fn name(&self) -> &str {
        "xml"
    }

    fn entry_filter(&self) -> EntryFilter {
        EntryFilter::suffix(".xml")
    }

    fn layout(&self) -> ReportLayout {
        ReportLayout::new(
            "Job Details",
            vec![
                LayoutColumn::renamed("XML File Name", "xml_file_name"),
                LayoutColumn::renamed("Extracted File Path", "command_path"),
                LayoutColumn::renamed("Extracted File Name", "command_file"),
                LayoutColumn::renamed("Extracted Table Name", "table_name"),
            ],
        )
    }

    fn analyze(&self, path: &Path) -> Result<Vec<FileRecord>, AnalysisError> {
        let document = std::fs::read_to_string(path)?;
        let details = JobDetails::extract(&document)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(vec![details.into_record(&file_name)])
    }
}
