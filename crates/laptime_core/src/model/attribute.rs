//! Configured lap-time attribute columns.
//!
//! # Responsibility
//! - Describe which duration columns a record carries and in what order.
//! - Map attribute keys to display labels (table headers, chart categories).
//!
//! # Invariants
//! - The set is non-empty.
//! - Keys are unique lowercase identifiers (`[a-z][a-z0-9_]*`).
//! - Order is the series value order.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One duration column: storage key plus display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub key: String,
    pub label: String,
}

impl AttributeSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Attribute declaration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    Empty,
    InvalidKey(String),
    DuplicateKey(String),
    EmptyLabel(String),
}

impl Display for AttributeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "attribute set must not be empty"),
            Self::InvalidKey(key) => write!(
                f,
                "attribute key `{key}` is invalid; expected lowercase letters, digits and `_`"
            ),
            Self::DuplicateKey(key) => write!(f, "attribute key `{key}` is declared twice"),
            Self::EmptyLabel(key) => write!(f, "attribute `{key}` has an empty label"),
        }
    }
}

impl Error for AttributeError {}

/// Ordered, validated set of duration columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AttributeSpec>", into = "Vec<AttributeSpec>")]
pub struct AttributeSet {
    specs: Vec<AttributeSpec>,
}

impl AttributeSet {
    /// Validates and wraps an ordered attribute list.
    pub fn new(specs: Vec<AttributeSpec>) -> Result<Self, AttributeError> {
        if specs.is_empty() {
            return Err(AttributeError::Empty);
        }
        for (index, spec) in specs.iter().enumerate() {
            if !is_valid_key(&spec.key) {
                return Err(AttributeError::InvalidKey(spec.key.clone()));
            }
            if spec.label.trim().is_empty() {
                return Err(AttributeError::EmptyLabel(spec.key.clone()));
            }
            if specs[..index].iter().any(|other| other.key == spec.key) {
                return Err(AttributeError::DuplicateKey(spec.key.clone()));
            }
        }
        Ok(Self { specs })
    }

    /// The three stages of the original lap board.
    pub fn lap_stages() -> Self {
        Self {
            specs: vec![
                AttributeSpec::new("city_escape", "City Escape"),
                AttributeSpec::new("wild_canyon", "Wild Canyon"),
                AttributeSpec::new("prison_lane", "Prison Lane"),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeSpec> {
        self.specs.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|spec| spec.key.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|spec| spec.label.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.specs.iter().any(|spec| spec.key == key)
    }

    /// Finds an attribute by key or label, ASCII case-insensitively.
    pub fn resolve(&self, name: &str) -> Option<&AttributeSpec> {
        let name = name.trim();
        self.specs.iter().find(|spec| {
            spec.key.eq_ignore_ascii_case(name) || spec.label.eq_ignore_ascii_case(name)
        })
    }
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::lap_stages()
    }
}

impl TryFrom<Vec<AttributeSpec>> for AttributeSet {
    type Error = AttributeError;

    fn try_from(value: Vec<AttributeSpec>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AttributeSet> for Vec<AttributeSpec> {
    fn from(value: AttributeSet) -> Self {
        value.specs
    }
}

fn is_valid_key(key: &str) -> bool {
    let mut bytes = key.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    bytes.all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_')
}

#[cfg(test)]
mod tests {
    use super::{AttributeError, AttributeSet, AttributeSpec};

    #[test]
    fn lap_stages_keep_declared_order() {
        let set = AttributeSet::lap_stages();
        assert_eq!(
            set.keys().collect::<Vec<_>>(),
            vec!["city_escape", "wild_canyon", "prison_lane"]
        );
        assert_eq!(set.resolve("wild canyon").unwrap().key, "wild_canyon");
        assert_eq!(set.resolve("PRISON_LANE").unwrap().label, "Prison Lane");
        assert!(set.resolve("green_hill").is_none());
    }

    #[test]
    fn rejects_invalid_declarations() {
        assert_eq!(AttributeSet::new(Vec::new()), Err(AttributeError::Empty));
        assert_eq!(
            AttributeSet::new(vec![AttributeSpec::new("City", "City")]),
            Err(AttributeError::InvalidKey("City".to_string()))
        );
        assert_eq!(
            AttributeSet::new(vec![
                AttributeSpec::new("lap", "Lap"),
                AttributeSpec::new("lap", "Lap again"),
            ]),
            Err(AttributeError::DuplicateKey("lap".to_string()))
        );
        assert_eq!(
            AttributeSet::new(vec![AttributeSpec::new("lap", " ")]),
            Err(AttributeError::EmptyLabel("lap".to_string()))
        );
    }
}
