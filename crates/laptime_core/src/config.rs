//! Board configuration.
//!
//! # Responsibility
//! - Describe the table label, chart title and lap attribute columns.
//! - Load that description from JSON.
//!
//! # Invariants
//! - A loaded config always carries a validated `AttributeSet`.
//! - Missing JSON fields fall back to the lap board defaults.

use crate::model::attribute::AttributeSet;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const DEFAULT_TABLE_LABEL: &str = "Contacts";
const DEFAULT_CHART_TITLE: &str = "Barchart Example";

/// Configuration load errors.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: String,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    EmptyTitle,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read config `{path}`: {source}"),
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::EmptyTitle => write!(f, "config chart_title must not be empty"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::EmptyTitle => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Caller-supplied board settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub table_label: String,
    pub chart_title: String,
    pub attributes: AttributeSet,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            table_label: DEFAULT_TABLE_LABEL.to_string(),
            chart_title: DEFAULT_CHART_TITLE.to_string(),
            attributes: AttributeSet::lap_stages(),
        }
    }
}

impl BoardConfig {
    /// Parses a JSON document. Attribute validation runs during parsing.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: BoardConfig = serde_json::from_str(text)?;
        if config.chart_title.trim().is_empty() {
            return Err(ConfigError::EmptyTitle);
        }
        Ok(config)
    }

    /// Reads and parses a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}
