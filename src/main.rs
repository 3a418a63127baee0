//! freqdist CLI
//!
//! Converts frequency distribution results to CSV (or passes JSON through)
//! and validates analysis configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use freqdist_flatten::commands::{
    display_version, execute_convert, validate_args, validate_config_file, ConvertArgs,
};
use freqdist_flatten::utils::config::{OutputFormat, FORMAT_ENV_VAR};

/// freqdist - flatten frequency distribution results
#[derive(Parser, Debug)]
#[command(name = "freqdist")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Format a backend result as CSV or JSON
    Convert {
        /// Backend result JSON file
        #[arg(short, long)]
        result: PathBuf,

        /// Task descriptor JSON file
        #[arg(short, long)]
        task: Option<PathBuf>,

        /// Name of a task defined in the config file
        #[arg(short, long)]
        analysis: Option<String>,

        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format, csv or json (overrides app.format)
        #[arg(short, long, env = FORMAT_ENV_VAR)]
        format: Option<OutputFormat>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration JSON file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Convert {
            result,
            task,
            analysis,
            config,
            format,
            output,
        } => {
            let args = ConvertArgs {
                result_path: result,
                task_path: task,
                analysis,
                config_path: config,
                format,
                output,
            };

            validate_args(&args)?;
            execute_convert(args)?;
        }

        Commands::Validate { config } => {
            validate_config_file(config)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
