//! Self-baseline percentages.
//!
//! Rows are grouped into classes by their key segment at the baseline depth.
//! Two passes are needed: class totals depend on every row of the class.

use super::flatten::{BaselineShare, FlatTable};
use crate::utils::error::FormatError;
use indexmap::IndexMap;
use log::debug;

/// Annotate every row with its baseline class and percentages
///
/// **Public** - main entry point for baseline aggregation
///
/// # Arguments
/// * `table` - Flattened rows
/// * `depth` - Key column holding the baseline class (0 = outermost)
///
/// # Returns
/// The same rows with `baseline` filled in
///
/// # Errors
/// * `FormatError::StructuralMismatch` - a key has no segment at `depth`
/// * `FormatError::ZeroTotal` - no unique authors at all
pub fn apply_baseline(mut table: FlatTable, depth: usize) -> Result<FlatTable, FormatError> {
    // Pass 1: class per row and per-class totals
    let mut class_totals: IndexMap<String, u64> = IndexMap::new();
    let mut classes = Vec::with_capacity(table.rows.len());

    for (key, row) in &table.rows {
        let class = key.segment(depth).ok_or_else(|| {
            FormatError::StructuralMismatch(format!(
                "key '{}' has {} columns, baseline depth is {}",
                key.to_csv(),
                key.len(),
                depth
            ))
        })?;
        *class_totals.entry(class.to_string()).or_insert(0) += row.unique_authors;
        classes.push(class.to_string());
    }

    let grand_total = table.total_unique_authors;
    if grand_total == 0 {
        return Err(FormatError::ZeroTotal);
    }

    debug!(
        "Baseline classes at depth {}: {} classes, {} total authors",
        depth,
        class_totals.len(),
        grand_total
    );

    // Pass 2: percentages against the grand total
    for (row, class) in table.rows.values_mut().zip(classes) {
        let class_total = class_totals.get(&class).copied().unwrap_or(0);
        row.baseline = Some(BaselineShare {
            class,
            class_total_unique_authors: class_total,
            percent_of_class: class_total as f64 / grand_total as f64,
            percent_of_total: row.unique_authors as f64 / grand_total as f64,
        });
    }

    table.mark_baseline_applied();
    Ok(table)
}
