//! Output rendering and writers.
//!
//! This module handles:
//! - CSV escaping and table rendering
//! - Writing formatted output to disk

pub mod csv;
pub mod writer;

// Re-export main functions
pub use csv::{escape_field, render_csv, render_header};
pub use writer::{output_file_path, read_json, write_output};
