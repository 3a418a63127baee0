//! Task descriptor model and eager validation.

use super::baseline::{locate_baseline, BaselineLevel};
use crate::utils::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Field names a descriptor object may carry, aliases included
pub const DESCRIPTOR_FIELDS: &[&str] = &[
    "name",
    "id",
    "target",
    "threshold",
    "filter",
    "index",
    "baseline",
    "analysis_tag",
    "analysisTag",
    "child",
    "then",
];

/// One level of a frequency distribution request
///
/// `child` and `then` are interchangeable names for the next level down;
/// giving both on the same level is rejected at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskDescriptor {
    /// Task name (single `freqDist` entries)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Member id (merged templates)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Field being broken down
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Maximum number of categories requested for this level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Name of the configured index queried
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    /// Marks this level as the self-baseline reference
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub baseline: bool,

    /// Tag-tree lookup metadata; not a nesting level
    #[serde(
        default,
        alias = "analysisTag",
        skip_serializing_if = "Option::is_none"
    )]
    pub analysis_tag: Option<serde_json::Value>,

    /// Next level down
    #[serde(default, alias = "then", skip_serializing_if = "Option::is_none")]
    pub child: Option<Box<TaskDescriptor>>,
}

impl TaskDescriptor {
    /// Create a single-level descriptor
    pub fn new(target: impl Into<String>, threshold: u32) -> Self {
        Self {
            target: Some(target.into()),
            threshold: Some(threshold),
            ..Default::default()
        }
    }

    /// Builder: attach the next level down
    pub fn with_child(mut self, child: TaskDescriptor) -> Self {
        self.child = Some(Box::new(child));
        self
    }

    /// Builder: flag this level as the baseline reference
    pub fn as_baseline(mut self) -> Self {
        self.baseline = true;
        self
    }

    /// Iterate levels from outermost to innermost
    pub fn levels(&self) -> impl Iterator<Item = &TaskDescriptor> {
        std::iter::successors(Some(self), |level| level.child.as_deref())
    }

    /// Number of nesting levels (1 for a single breakdown)
    pub fn depth(&self) -> usize {
        self.levels().count()
    }

    /// Validate the descriptor chain
    ///
    /// # Errors
    /// * `ConfigError::MissingTarget` - a level has neither a target nor an analysis tag
    /// * `ConfigError::InvalidThreshold` - a level asks for zero categories
    /// * `ConfigError::MultipleBaselines` - more than one level is flagged as baseline
    ///
    /// # Returns
    /// The baseline level, when one is flagged
    pub fn validate(&self) -> Result<Option<BaselineLevel>, ConfigError> {
        for (depth, level) in self.levels().enumerate() {
            if level.target.is_none() && level.analysis_tag.is_none() {
                return Err(ConfigError::MissingTarget {
                    path: field_path(depth, "target"),
                });
            }
            if level.threshold == Some(0) {
                return Err(ConfigError::InvalidThreshold {
                    path: field_path(depth, "threshold"),
                });
            }
        }

        locate_baseline(self)
    }
}

/// Dotted path of `field` at nesting `depth`, e.g. `child.child.baseline`
pub fn field_path(depth: usize, field: &str) -> String {
    let mut path = "child.".repeat(depth);
    path.push_str(field);
    path
}
