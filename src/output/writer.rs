//! Output file writer.
//!
//! Writes formatted results (CSV text or pretty JSON) to disk and reads
//! JSON inputs back.

use crate::formatter::FormattedOutput;
use crate::utils::error::OutputError;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write formatted output to a file
///
/// **Public** - main entry point for file output
///
/// # Arguments
/// * `output` - CSV text or JSON value to write
/// * `output_path` - Destination file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_output(
    output: &FormattedOutput,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing {} output to: {}", output.format(), output_path.display());

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    match output {
        FormattedOutput::Csv(csv) => writer.write_all(csv.as_bytes())?,
        FormattedOutput::Json(value) => serde_json::to_writer_pretty(&mut writer, value)?,
    }
    writer.flush()?;

    info!(
        "Output written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Generated file path for a task: `<dir>/<task>-<YYYYmmdd-HHMMSS>.<ext>`
///
/// Path separators in the task name are replaced so merged-template names
/// (`template/id`) stay inside `dir`.
pub fn output_file_path(
    dir: impl AsRef<Path>,
    task_name: &str,
    output: &FormattedOutput,
    timestamp: DateTime<Utc>,
) -> PathBuf {
    let safe_name: String = task_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();

    dir.as_ref().join(format!(
        "{}-{}.{}",
        safe_name,
        timestamp.format("%Y%m%d-%H%M%S"),
        output.format().extension()
    ))
}

/// Read a JSON document (task descriptor or backend result)
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_json(input_path: impl AsRef<Path>) -> Result<Value, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading JSON from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let value = serde_json::from_reader(BufReader::new(file))
        .map_err(OutputError::SerializationFailed)?;

    Ok(value)
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Calculate file size in bytes
///
/// **Private** - internal utility
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
