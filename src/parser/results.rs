//! Parse backend frequency distribution JSON into a tagged result tree.
//!
//! Accepted shapes:
//! - a node `{ key, interactions, unique_authors, child? }`
//! - an array of nodes
//! - `{ results: [...] }` and `{ analysis: { results: [...] } }` envelopes
//! - merged-task objects keyed by category label, e.g. `{ "male__18-24": [...] }`

use super::schema::ResultNode;
use crate::utils::config::RESERVED_RESULT_FIELDS;
use crate::utils::error::{EscapeError, ParseError};
use log::debug;
use serde_json::{Map, Value};

/// Parse a raw backend result
///
/// **Public** - main entry point for result parsing
///
/// # Arguments
/// * `raw` - JSON returned by the query side for one task
///
/// # Returns
/// Top-level nodes in document order
///
/// # Errors
/// * `ParseError::InvalidFormat` - a value that is neither a node nor an envelope
/// * `ParseError::InvalidCount` - a leaf without non-negative integer counts
/// * `ParseError::InvalidKey` - a key that is not a string or number
pub fn parse_results(raw: &Value) -> Result<Vec<ResultNode>, ParseError> {
    let mut nodes = Vec::new();
    collect_nodes(raw, "$", &mut nodes)?;

    debug!(
        "Parsed {} top-level result nodes ({} leaves)",
        nodes.len(),
        nodes.iter().map(ResultNode::leaf_count).sum::<usize>()
    );

    Ok(nodes)
}

/// Render a scalar JSON value as a category label
///
/// # Errors
/// * `EscapeError::UnsupportedType` - value is not a string or number
pub fn scalar_to_label(value: &Value) -> Result<String, EscapeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(EscapeError::UnsupportedType {
            kind: json_kind(other),
        }),
    }
}

fn collect_nodes(value: &Value, path: &str, out: &mut Vec<ResultNode>) -> Result<(), ParseError> {
    match value {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_nodes(item, &format!("{}[{}]", path, i), out)?;
            }
            Ok(())
        }
        Value::Object(obj) => {
            if obj.contains_key("key") {
                out.push(parse_node(obj, path)?);
                return Ok(());
            }
            if let Some(analysis) = obj.get("analysis") {
                return collect_nodes(analysis, &format!("{}.analysis", path), out);
            }
            if let Some(results) = obj.get("results") {
                return collect_nodes(results, &format!("{}.results", path), out);
            }
            collect_merged(obj, path, out)
        }
        other => Err(ParseError::InvalidFormat(format!(
            "expected result object or array at {}, found {}",
            path,
            json_kind(other)
        ))),
    }
}

/// Merged-task object: every non-reserved property is a category label
fn collect_merged(
    obj: &Map<String, Value>,
    path: &str,
    out: &mut Vec<ResultNode>,
) -> Result<(), ParseError> {
    for (label, value) in obj {
        if RESERVED_RESULT_FIELDS.contains(&label.as_str()) {
            continue;
        }
        let mut children = Vec::new();
        collect_nodes(value, &format!("{}.{}", path, label), &mut children)?;
        out.push(ResultNode::branch(label.clone(), children));
    }
    Ok(())
}

fn parse_node(obj: &Map<String, Value>, path: &str) -> Result<ResultNode, ParseError> {
    let key = obj
        .get("key")
        .map(scalar_to_label)
        .transpose()?
        .unwrap_or_default();

    match obj.get("child") {
        Some(child) if !child.is_null() => {
            let mut children = Vec::new();
            collect_nodes(child, &format!("{}.child", path), &mut children)?;
            Ok(ResultNode::Branch { key, children })
        }
        _ => {
            let interactions = read_count(obj, "interactions", &key)?;
            let unique_authors = read_count(obj, "unique_authors", &key)?;
            Ok(ResultNode::Leaf {
                key,
                interactions,
                unique_authors,
            })
        }
    }
}

fn read_count(obj: &Map<String, Value>, field: &'static str, key: &str) -> Result<u64, ParseError> {
    obj.get(field)
        .and_then(Value::as_u64)
        .ok_or_else(|| ParseError::InvalidCount {
            key: key.to_string(),
            field,
        })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
