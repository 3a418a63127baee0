//! Format a completed query result for output.
//!
//! For CSV the pipeline is:
//! 1. Validate the task descriptor and locate the baseline level
//! 2. Parse the result into a tagged tree
//! 3. Flatten the tree into composite-keyed rows
//! 4. Apply baseline percentages (when a level is flagged)
//! 5. Render the CSV document
//!
//! JSON output is the backend result passed through unchanged.

use crate::aggregator::{apply_baseline, flatten_tree, FlatTable};
use crate::output::render_csv;
use crate::parser::{parse_results, ResultNode};
use crate::task::TaskDescriptor;
use crate::utils::config::OutputFormat;
use crate::utils::error::FormatError;
use log::info;
use serde_json::Value;

/// A formatted result, ready for the writer
#[derive(Debug, Clone, PartialEq)]
pub enum FormattedOutput {
    Csv(String),
    Json(Value),
}

impl FormattedOutput {
    pub fn format(&self) -> OutputFormat {
        match self {
            FormattedOutput::Csv(_) => OutputFormat::Csv,
            FormattedOutput::Json(_) => OutputFormat::Json,
        }
    }

    /// Text form: CSV as is, JSON pretty-printed
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        match self {
            FormattedOutput::Csv(csv) => Ok(csv.clone()),
            FormattedOutput::Json(value) => serde_json::to_string_pretty(value),
        }
    }
}

/// Format one task's result in the selected output format
///
/// **Public** - main entry point called by commands
///
/// # Arguments
/// * `task` - Descriptor of the breakdown that produced `raw`
/// * `raw` - Backend result
/// * `format` - Output format selector
///
/// # Errors
/// Any error from [`json_to_csv`] when `format` is CSV; JSON never fails
pub fn format_result(
    task: &TaskDescriptor,
    raw: Value,
    format: OutputFormat,
) -> Result<FormattedOutput, FormatError> {
    match format {
        OutputFormat::Json => Ok(FormattedOutput::Json(raw)),
        OutputFormat::Csv => json_to_csv(task, &raw).map(FormattedOutput::Csv),
    }
}

/// Convert a backend result to a CSV document
///
/// # Errors
/// * `FormatError::Config` - invalid descriptor (e.g. several baseline flags)
/// * `FormatError::Parse` - result JSON is not a frequency distribution
/// * `FormatError::StructuralMismatch` - result shape does not fit the descriptor
/// * `FormatError::ZeroTotal` - baseline requested on a result without authors
pub fn json_to_csv(task: &TaskDescriptor, raw: &Value) -> Result<String, FormatError> {
    info!("Converting to CSV...");

    let baseline = task.validate()?;

    let nodes = parse_results(raw)?;
    let table = flatten_tree(&nodes)?;
    check_shape(task, &nodes, &table)?;

    let table = match baseline {
        Some(level) => {
            info!("Calculating self baseline against {}", level.label);
            apply_baseline(table, level.depth)?
        }
        None => table,
    };

    Ok(render_csv(&table))
}

/// The result must not nest deeper than the descriptor, and rows need at
/// least one key column per descriptor level
///
/// Merged labels (`male__18-24`) fold several levels into one tree level but
/// still split into one column each, so a shallower tree is accepted as long
/// as the columns add up.
fn check_shape(
    task: &TaskDescriptor,
    nodes: &[ResultNode],
    table: &FlatTable,
) -> Result<(), FormatError> {
    let expected = task.depth();

    let tree_depth = nodes.iter().map(ResultNode::depth).max().unwrap_or(0);
    if tree_depth > expected {
        return Err(FormatError::StructuralMismatch(format!(
            "result nests {} levels deep, task describes {} levels",
            tree_depth, expected
        )));
    }

    if !table.rows.is_empty() && table.key_columns() < expected {
        return Err(FormatError::StructuralMismatch(format!(
            "rows have {} key columns, task describes {} levels",
            table.key_columns(),
            expected
        )));
    }
    Ok(())
}
