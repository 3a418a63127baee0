//! Flatten a result tree into rows keyed by composite category keys.
//!
//! Every branch contributes its key segment(s) on the way down; every leaf
//! closes a composite key and contributes its counts. A label merged with the
//! `__` delimiter contributes one segment per sub-label.
//!
//! Example: branch `male` → leaf `18-24__photo` gives the key `male,18-24,photo`.

use crate::output::csv::escape_field;
use crate::parser::ResultNode;
use crate::utils::config::MERGE_DELIMITER;
use crate::utils::error::FormatError;
use indexmap::IndexMap;
use log::debug;

/// Ordered, escaped key segments identifying one output row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey(Vec<String>);

impl CompositeKey {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of key columns
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Segment at column `index` (0 = outermost)
    pub fn segment(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Segments joined as CSV columns
    pub fn to_csv(&self) -> String {
        self.0.join(",")
    }
}

/// Baseline composition figures for one row
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineShare {
    /// Key segment at the baseline depth
    pub class: String,

    /// Unique authors summed over every row of this class
    pub class_total_unique_authors: u64,

    /// Class total over the grand total
    pub percent_of_class: f64,

    /// Row unique authors over the grand total
    pub percent_of_total: f64,
}

/// Aggregated counts for one composite key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateRow {
    pub interactions: u64,
    pub unique_authors: u64,

    /// Present once the baseline pass has run
    pub baseline: Option<BaselineShare>,
}

/// Rows of one task, in traversal order
#[derive(Debug, Clone, Default)]
pub struct FlatTable {
    pub rows: IndexMap<CompositeKey, AggregateRow>,

    /// Unique authors summed over all leaves
    pub total_unique_authors: u64,

    /// Leaves visited (equals `rows.len()` unless paths repeat)
    pub leaf_count: usize,

    key_columns: Option<usize>,
    baseline_applied: bool,
}

impl FlatTable {
    /// Key columns shared by every row (0 for an empty table)
    pub fn key_columns(&self) -> usize {
        self.key_columns.unwrap_or(0)
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline_applied
    }

    pub(crate) fn mark_baseline_applied(&mut self) {
        self.baseline_applied = true;
    }

    /// Add one leaf's counts under `key`
    ///
    /// # Errors
    /// * `FormatError::StructuralMismatch` - `key` has a different column count than earlier rows
    fn record(
        &mut self,
        key: CompositeKey,
        interactions: u64,
        unique_authors: u64,
    ) -> Result<(), FormatError> {
        match self.key_columns {
            None => self.key_columns = Some(key.len()),
            Some(expected) if expected != key.len() => {
                return Err(FormatError::StructuralMismatch(format!(
                    "row '{}' has {} key columns, expected {}",
                    key.to_csv(),
                    key.len(),
                    expected
                )));
            }
            Some(_) => {}
        }

        let row = self.rows.entry(key).or_default();
        row.interactions += interactions;
        row.unique_authors += unique_authors;

        self.total_unique_authors += unique_authors;
        self.leaf_count += 1;
        Ok(())
    }
}

/// Flatten result nodes into a table of aggregated rows
///
/// **Public** - main entry point for flattening
///
/// # Arguments
/// * `nodes` - Top-level nodes from the parser
///
/// # Returns
/// Rows keyed by composite key, in traversal order, with the unique author total
///
/// # Errors
/// * `FormatError::StructuralMismatch` - leaves at different key depths
pub fn flatten_tree(nodes: &[ResultNode]) -> Result<FlatTable, FormatError> {
    let mut table = FlatTable::default();
    let mut prefix = Vec::new();

    for node in nodes {
        walk(node, &mut prefix, &mut table)?;
    }

    debug!(
        "Flattened {} leaves into {} rows with {} key columns",
        table.leaf_count,
        table.rows.len(),
        table.key_columns()
    );

    Ok(table)
}

fn walk(
    node: &ResultNode,
    prefix: &mut Vec<String>,
    table: &mut FlatTable,
) -> Result<(), FormatError> {
    let pushed = push_segments(prefix, node.key());

    let result = match node {
        ResultNode::Branch { children, .. } => children
            .iter()
            .try_for_each(|child| walk(child, prefix, table)),
        ResultNode::Leaf {
            interactions,
            unique_authors,
            ..
        } => table.record(CompositeKey::new(prefix.clone()), *interactions, *unique_authors),
    };

    prefix.truncate(prefix.len() - pushed);
    result
}

/// Split `label` on the merge delimiter and push each escaped piece
///
/// Returns the number of segments pushed.
fn push_segments(prefix: &mut Vec<String>, label: &str) -> usize {
    let before = prefix.len();
    prefix.extend(label.split(MERGE_DELIMITER).map(escape_field));
    prefix.len() - before
}
