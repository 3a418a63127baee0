//! freqdist-flatten
//!
//! Flattens nested frequency distribution results from a social-media
//! analytics backend into CSV rows, optionally annotated with self-baseline
//! composition percentages.
//!
//! ## Getting Started
//!
//! ```bash
//! freqdist convert --task task.json --result result.json --format csv
//! freqdist validate --config config.json
//! ```

pub mod aggregator;
pub mod commands;
pub mod formatter;
pub mod output;
pub mod parser;
pub mod task;
pub mod utils;

pub use formatter::{format_result, json_to_csv, FormattedOutput};
pub use task::TaskDescriptor;
pub use utils::config::OutputFormat;
