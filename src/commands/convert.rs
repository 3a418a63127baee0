//! Convert command implementation.
//!
//! The convert command:
//! 1. Loads configuration (optional)
//! 2. Resolves and validates the task descriptor
//! 3. Reads the backend result
//! 4. Formats it as CSV or JSON
//! 5. Writes the output to a file or stdout

use super::models::ConvertArgs;
use crate::formatter::format_result;
use crate::output::{output_file_path, read_json, write_output};
use crate::task::TaskDescriptor;
use crate::utils::config::AppConfig;
use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};
use std::path::Path;
use std::time::Instant;

/// Execute the convert command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Unreadable or invalid config, task or result files
/// * Configuration and structural errors from formatting
/// * File write errors
pub fn execute_convert(args: ConvertArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Step 1/4: Loading configuration...");
    let config = match &args.config_path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };

    info!("Step 2/4: Resolving task...");
    let (task_name, task) = resolve_task(&args, &config)?;
    config
        .validate_task(&task)
        .with_context(|| format!("Invalid task '{}'", task_name))?;
    debug!("Task '{}' has {} levels", task_name, task.depth());

    info!("Step 3/4: Formatting result...");
    let raw = read_json(&args.result_path)
        .with_context(|| format!("Failed to read result {}", args.result_path.display()))?;
    let format = config.resolve_format(args.format);
    let output = format_result(&task, raw, format)
        .with_context(|| format!("Failed to format result for task '{}'", task_name))?;

    info!("Step 4/4: Writing output...");
    let destination = match args.output {
        Some(path) => Some(path),
        None if config.app.write_to_file => Some(output_file_path(
            &config.app.output_dir,
            &task_name,
            &output,
            Utc::now(),
        )),
        None => None,
    };

    match destination {
        Some(path) => {
            write_output(&output, &path).context("Failed to write output")?;
            info!("✓ Output written to: {}", path.display());
        }
        None => {
            let text = output.to_text().context("Failed to serialize output")?;
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
        }
    }

    info!(
        "Convert completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Validate convert arguments
///
/// **Public** - can be called before execute_convert for early validation
pub fn validate_args(args: &ConvertArgs) -> Result<()> {
    if args.result_path.as_os_str().is_empty() {
        anyhow::bail!("Result path cannot be empty");
    }

    match (&args.task_path, &args.analysis) {
        (Some(_), Some(_)) => anyhow::bail!("Use either --task or --analysis, not both"),
        (None, None) => anyhow::bail!("One of --task or --analysis is required"),
        (None, Some(_)) if args.config_path.is_none() => {
            anyhow::bail!("--analysis requires --config")
        }
        _ => Ok(()),
    }
}

/// Load the task from its own file or look it up by name in the config
fn resolve_task(args: &ConvertArgs, config: &AppConfig) -> Result<(String, TaskDescriptor)> {
    if let Some(path) = &args.task_path {
        let value = read_json(path)
            .with_context(|| format!("Failed to read task {}", path.display()))?;
        let task: TaskDescriptor = serde_json::from_value(value)
            .with_context(|| format!("Invalid task descriptor {}", path.display()))?;
        let name = task
            .name
            .clone()
            .unwrap_or_else(|| file_stem(path));
        return Ok((name, task));
    }

    let name = args
        .analysis
        .as_deref()
        .context("No task given (use --task or --analysis)")?;
    let named = config
        .find_task(name)
        .with_context(|| format!("No analysis named '{}' in config", name))?;
    Ok((named.name, named.task))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "task".to_string())
}
