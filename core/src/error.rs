use std::path::PathBuf;

use thiserror::Error;

/// Failure to load a rule table document.
///
/// Every variant that concerns a single entry names it, so a service that
/// fails to start can point the operator at the offending rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("failed to read rule table from {path}: {message}")]
    Io { path: PathBuf, message: String },
    #[error("rule table document is empty")]
    Empty,
    #[error("malformed rule table at {location}: {message}")]
    Malformed { location: String, message: String },
    #[error("unknown field '{field}' in rule {location}")]
    UnknownField { location: String, field: String },
    #[error("rule table contains an empty policy name")]
    EmptyPolicyName,
    #[error("rule table rejected: {}", issues.join("; "))]
    Rejected { issues: Vec<String> },
}

impl LoadError {
    pub(crate) fn malformed(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            location: location.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

/// The configuration exposes no field with the requested policy name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown policy '{name}'")]
pub struct UnknownPolicyError {
    pub name: String,
}

impl UnknownPolicyError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported configuration format for {path} (expected .toml or .json)")]
    UnsupportedFormat { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read role catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid role catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("role catalog lists '{name}' more than once")]
    DuplicateRole { name: String },
    #[error("role catalog key '{key}' does not match role name '{name}'")]
    MismatchedKey { key: String, name: String },
}
