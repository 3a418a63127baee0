//! Configuration and constants.
//!
//! The configuration file is JSON with three sections:
//! - `app`: output format, file output toggle, output directory
//! - `index`: named indexes that task descriptors refer to
//! - `analysis`: `freqDist` task templates (`timeSeries` is accepted and ignored)

use crate::task::{TaskDescriptor, DESCRIPTOR_FIELDS};
use crate::utils::error::ConfigError;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Delimiter the backend uses when merging several category labels into one key
pub const MERGE_DELIMITER: &str = "__";

/// Environment variable overriding `app.format`
pub const FORMAT_ENV_VAR: &str = "FORMAT";

/// Default directory for generated output files
pub const DEFAULT_OUTPUT_DIR: &str = "output";

// CSV header pieces. Column naming and order are a stable output contract.
pub const KEY_COLUMN_PREFIX: &str = "key";
pub const COUNT_HEADERS: &str = "interactions,unique_authors";
pub const BASELINE_HEADERS: &str = "baselinekey_percent,percent_of_total,total_authors";

// Bookkeeping fields the backend attaches to result objects. They are never category labels.
pub const RESERVED_RESULT_FIELDS: &[&str] = &[
    "total_unique_authors",
    "interactions_percentage",
    "unique_authors_percentage",
    "target",
    "results",
    "redacted",
    "analysis_type",
    "key",
    "interactions",
    "unique_authors",
    "child",
    "threshold",
    "parameters",
];

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Flattened CSV table
    Csv,
    /// Backend JSON passed through unchanged
    #[default]
    Json,
}

impl OutputFormat {
    /// File extension for generated output files
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Case-insensitive; used for `--format` and the `FORMAT` variable
impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,

    /// Named indexes, keyed by the name task descriptors use in `index`
    #[serde(default)]
    pub index: BTreeMap<String, IndexConfig>,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub format: OutputFormat,

    /// Write output to a generated file under `output_dir` when no path is given
    #[serde(default)]
    pub write_to_file: bool,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            write_to_file: false,
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

/// A configured index. Credentials and other fields belong to the query side and are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    pub id: String,
}

/// Analysis templates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(
        default,
        rename = "freqDist",
        alias = "freq_dist",
        deserialize_with = "deserialize_entries"
    )]
    pub freq_dist: Vec<AnalysisEntry>,
}

fn deserialize_entries<'de, D>(deserializer: D) -> Result<Vec<AnalysisEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    raw.iter()
        .enumerate()
        .map(|(position, value)| {
            AnalysisEntry::from_value(value, position).map_err(serde::de::Error::custom)
        })
        .collect()
}

/// One `freqDist` entry: a single descriptor, or a merged template of several descriptors
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalysisEntry {
    Single(TaskDescriptor),
    Merged(BTreeMap<String, Vec<TaskDescriptor>>),
}

/// A task descriptor together with the name it is addressed by
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTask {
    pub name: String,
    /// Field path of the descriptor inside the config file
    pub path: String,
    pub task: TaskDescriptor,
}

impl AnalysisEntry {
    /// Decode the entry at `position` of `freqDist`
    ///
    /// An object whose keys are all template names mapping to arrays is a
    /// merged template; anything else is read as a single descriptor.
    ///
    /// # Errors
    /// * `ConfigError::InvalidEntry` - a descriptor does not decode, with its field path
    pub fn from_value(value: &Value, position: usize) -> Result<Self, ConfigError> {
        let root = entry_path(position);

        let templates = match value.as_object() {
            Some(obj) if is_merged_template(obj) => obj,
            _ => return parse_descriptor(value, &root).map(AnalysisEntry::Single),
        };

        let mut merged = BTreeMap::new();
        for (template, members) in templates {
            let tasks = members
                .as_array()
                .into_iter()
                .flatten()
                .enumerate()
                .map(|(i, member)| {
                    parse_descriptor(member, &format!("{}.{}[{}]", root, template, i))
                })
                .collect::<Result<Vec<_>, _>>()?;
            merged.insert(template.clone(), tasks);
        }
        Ok(AnalysisEntry::Merged(merged))
    }

    /// Expand this entry into concrete named tasks
    ///
    /// Single descriptors use their `name` (or their position); merged templates
    /// produce `<template>/<id>` for each member.
    pub fn tasks(&self, position: usize) -> Vec<NamedTask> {
        let root = entry_path(position);
        match self {
            AnalysisEntry::Single(task) => vec![NamedTask {
                name: task
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("freqDist-{}", position)),
                path: root,
                task: task.clone(),
            }],
            AnalysisEntry::Merged(templates) => templates
                .iter()
                .flat_map(|(template, members)| {
                    let root = &root;
                    members.iter().enumerate().map(move |(i, task)| {
                        let member = task.id.clone().unwrap_or_else(|| i.to_string());
                        NamedTask {
                            name: format!("{}/{}", template, member),
                            path: format!("{}.{}[{}]", root, template, i),
                            task: task.clone(),
                        }
                    })
                })
                .collect(),
        }
    }
}

fn entry_path(position: usize) -> String {
    format!("analysis.freqDist[{}]", position)
}

fn is_merged_template(obj: &Map<String, Value>) -> bool {
    !obj.is_empty()
        && obj
            .iter()
            .all(|(name, members)| members.is_array() && !DESCRIPTOR_FIELDS.contains(&name.as_str()))
}

fn parse_descriptor(value: &Value, path: &str) -> Result<TaskDescriptor, ConfigError> {
    TaskDescriptor::deserialize(value).map_err(|e| ConfigError::InvalidEntry {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

impl AppConfig {
    /// Load configuration from a JSON file
    ///
    /// # Errors
    /// * `ConfigError::Io` - file cannot be read
    /// * `ConfigError::Json` - file is not a valid configuration
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(content)?;
        debug!(
            "Configuration loaded: format={}, {} indexes, {} freqDist entries",
            config.app.format,
            config.index.len(),
            config.analysis.freq_dist.len()
        );
        Ok(config)
    }

    /// All `freqDist` tasks, templates expanded, in file order
    pub fn tasks(&self) -> Vec<NamedTask> {
        self.analysis
            .freq_dist
            .iter()
            .enumerate()
            .flat_map(|(position, entry)| entry.tasks(position))
            .collect()
    }

    /// Find a task by name
    pub fn find_task(&self, name: &str) -> Option<NamedTask> {
        self.tasks().into_iter().find(|t| t.name == name)
    }

    /// Validate every task eagerly
    ///
    /// Runs descriptor validation and index resolution on each task.
    /// Error paths are prefixed with the task's location in the file.
    pub fn validate(&self) -> Result<Vec<NamedTask>, ConfigError> {
        let tasks = self.tasks();
        for named in &tasks {
            self.validate_task(&named.task)
                .map_err(|e| e.within(&named.path))?;
        }
        Ok(tasks)
    }

    /// Validate one descriptor against this configuration
    pub fn validate_task(&self, task: &TaskDescriptor) -> Result<(), ConfigError> {
        task.validate()?;

        // Index names are only checked when indexes are configured at all
        if self.index.is_empty() {
            return Ok(());
        }
        for (depth, level) in task.levels().enumerate() {
            if let Some(index) = &level.index {
                if !self.index.contains_key(index) {
                    return Err(ConfigError::UnknownIndex {
                        path: crate::task::field_path(depth, "index"),
                        index: index.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Pick the output format: an explicit override wins over `app.format`
    pub fn resolve_format(&self, override_format: Option<OutputFormat>) -> OutputFormat {
        override_format.unwrap_or(self.app.format)
    }
}
