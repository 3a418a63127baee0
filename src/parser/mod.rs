//! Result parsing and the tagged result tree.
//!
//! This module handles:
//! - Parsing raw frequency distribution JSON from the backend
//! - Classifying nodes into branches and leaves
//! - Rendering scalar keys as labels

pub mod results;
pub mod schema;

// Re-export main types
pub use results::{parse_results, scalar_to_label};
pub use schema::ResultNode;
