//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors raised while loading or validating configuration and task descriptors
///
/// Detected eagerly, before any result is formatted. `path` is the
/// dotted field path of the offending value (e.g. `child.child.baseline`).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("multiple baseline flags in one task: '{first}' and '{second}'")]
    MultipleBaselines { first: String, second: String },

    #[error("missing target at '{path}' (required unless an analysis tag is set)")]
    MissingTarget { path: String },

    #[error("invalid threshold at '{path}': must be greater than 0")]
    InvalidThreshold { path: String },

    #[error("unknown index '{index}' referenced at '{path}'")]
    UnknownIndex { path: String, index: String },

    #[error("invalid task descriptor at '{path}': {reason}")]
    InvalidEntry { path: String, reason: String },

    #[error("unknown output format '{0}' (expected 'csv' or 'json')")]
    UnknownFormat(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Prefix every field path in this error with `root`
    pub fn within(self, root: &str) -> Self {
        let join = |path: String| {
            if root.is_empty() {
                path
            } else {
                format!("{}.{}", root, path)
            }
        };
        match self {
            ConfigError::MultipleBaselines { first, second } => ConfigError::MultipleBaselines {
                first: join(first),
                second: join(second),
            },
            ConfigError::MissingTarget { path } => ConfigError::MissingTarget { path: join(path) },
            ConfigError::InvalidThreshold { path } => {
                ConfigError::InvalidThreshold { path: join(path) }
            }
            ConfigError::UnknownIndex { path, index } => ConfigError::UnknownIndex {
                path: join(path),
                index,
            },
            ConfigError::InvalidEntry { path, reason } => ConfigError::InvalidEntry {
                path: join(path),
                reason,
            },
            other => other,
        }
    }
}

/// Errors raised when a scalar cannot be rendered as a CSV field
#[derive(Error, Debug)]
pub enum EscapeError {
    #[error("cannot render {kind} as a CSV field (expected string or number)")]
    UnsupportedType { kind: &'static str },
}

/// Errors that can occur while parsing a backend result tree
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid result format: {0}")]
    InvalidFormat(String),

    #[error("Invalid count '{field}' on node '{key}': expected a non-negative integer")]
    InvalidCount { key: String, field: &'static str },

    #[error("Invalid key: {0}")]
    InvalidKey(#[from] EscapeError),
}

/// Errors that can occur while flattening and formatting a result
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("result parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),

    #[error("baseline requested but the result holds no unique authors")]
    ZeroTotal,
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
