//! Locate the nesting level configured as the self-baseline reference.

use super::descriptor::{field_path, TaskDescriptor};
use crate::utils::error::ConfigError;
use log::debug;

/// The baseline level of a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineLevel {
    /// Nesting depth of the flagged level (0 = outermost)
    pub depth: usize,

    /// Diagnostic label: the level's target, or `Analysis Tag (Level N)`
    pub label: String,
}

/// Find the level flagged `baseline: true`
///
/// **Public** - used by the formatter and by config validation
///
/// Walks the descriptor chain outermost first; the depth counter grows by one per
/// nested level. Analysis tags are metadata and never count as a level.
///
/// # Returns
/// `Some(level)` for the flagged level, `None` when no level is flagged
///
/// # Errors
/// * `ConfigError::MultipleBaselines` - a second flagged level was found
pub fn locate_baseline(task: &TaskDescriptor) -> Result<Option<BaselineLevel>, ConfigError> {
    let mut found: Option<(BaselineLevel, String)> = None;

    for (depth, level) in task.levels().enumerate() {
        if !level.baseline {
            continue;
        }

        let path = field_path(depth, "baseline");
        if let Some((_, first)) = found {
            return Err(ConfigError::MultipleBaselines {
                first,
                second: path,
            });
        }

        let label = baseline_label(level, depth);
        debug!("Baseline flag found at depth {} ({})", depth, label);
        found = Some((BaselineLevel { depth, label }, path));
    }

    Ok(found.map(|(level, _)| level))
}

fn baseline_label(level: &TaskDescriptor, depth: usize) -> String {
    if level.analysis_tag.is_some() {
        format!("Analysis Tag (Level {})", depth)
    } else {
        level.target.clone().unwrap_or_else(|| "unknown".to_string())
    }
}
