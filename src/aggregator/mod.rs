//! Aggregation of result trees into flat rows.
//!
//! This module transforms parsed result trees into:
//! - Composite-keyed rows with summed counts
//! - Per-class baseline totals and percentages

pub mod baseline;
pub mod flatten;

// Re-export main types and functions
pub use baseline::apply_baseline;
pub use flatten::{flatten_tree, AggregateRow, BaselineShare, CompositeKey, FlatTable};
