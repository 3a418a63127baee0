//! CSV rendering of flattened tables.
//!
//! Layout (a stable contract for downstream spreadsheets):
//! `keyN,...,key1,interactions,unique_authors[,baselinekey_percent,percent_of_total,total_authors]`

use crate::aggregator::FlatTable;
use crate::utils::config::{BASELINE_HEADERS, COUNT_HEADERS, KEY_COLUMN_PREFIX};

/// Escape one field for CSV
///
/// Newlines are stripped first, embedded quotes are doubled, and the field is
/// quoted when it contains a comma or a quote.
pub fn escape_field(raw: &str) -> String {
    let field: String = raw.chars().filter(|c| *c != '\n' && *c != '\r').collect();

    if field.contains('"') || field.contains(',') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field
    }
}

/// Header line for `key_columns` key columns (no trailing newline)
pub fn render_header(key_columns: usize, with_baseline: bool) -> String {
    let mut header: Vec<String> = (1..=key_columns)
        .rev()
        .map(|n| format!("{}{}", KEY_COLUMN_PREFIX, n))
        .collect();
    header.push(COUNT_HEADERS.to_string());
    if with_baseline {
        header.push(BASELINE_HEADERS.to_string());
    }
    header.join(",")
}

/// Render a flattened table as a CSV document
///
/// **Public** - main entry point for CSV output
///
/// Rows keep traversal order; every line ends with `\n`.
pub fn render_csv(table: &FlatTable) -> String {
    let with_baseline = table.has_baseline();
    let mut csv = render_header(table.key_columns(), with_baseline);
    csv.push('\n');

    for (key, row) in &table.rows {
        if !key.is_empty() {
            csv.push_str(&key.to_csv());
            csv.push(',');
        }
        csv.push_str(&format!("{},{}", row.interactions, row.unique_authors));

        if let (true, Some(share)) = (with_baseline, &row.baseline) {
            csv.push_str(&format!(
                ",{},{},{}",
                share.percent_of_class, share.percent_of_total, table.total_unique_authors
            ));
        }
        csv.push('\n');
    }

    csv
}
