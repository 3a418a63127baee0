use crate::utils::config::OutputFormat;
use std::path::PathBuf;

/// Arguments for the convert command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct ConvertArgs {
    /// Backend result JSON to format
    pub result_path: PathBuf,

    /// Task descriptor JSON file (alternative to `analysis`)
    pub task_path: Option<PathBuf>,

    /// Named task from the config file (alternative to `task_path`)
    pub analysis: Option<String>,

    /// Configuration file
    pub config_path: Option<PathBuf>,

    /// Output format override (CLI flag or FORMAT env var)
    pub format: Option<OutputFormat>,

    /// Output file; stdout unless `app.write_to_file` is set
    pub output: Option<PathBuf>,
}
