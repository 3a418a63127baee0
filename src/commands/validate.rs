//! Validate command implementation.
//!
//! Loads a configuration file and checks every `freqDist` task before any
//! query would be issued.

use crate::task::locate_baseline;
use crate::utils::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Validate a configuration file and print its tasks
pub fn validate_config_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    println!("Validating config: {}", path.display());

    let config = AppConfig::load(path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    let tasks = config.validate().context("Invalid analysis configuration")?;

    println!("✓ Valid configuration");
    println!("  Format: {}", config.app.format);
    println!("  Indexes: {}", config.index.len());
    println!("  Tasks: {}", tasks.len());

    for named in &tasks {
        let baseline = locate_baseline(&named.task)?
            .map(|level| format!("baseline at level {} ({})", level.depth, level.label))
            .unwrap_or_else(|| "no baseline".to_string());
        println!(
            "    {} - {} levels, {}",
            named.name,
            named.task.depth(),
            baseline
        );
    }

    Ok(())
}
