//! Contact record model.
//!
//! # Responsibility
//! - Define one contact row with its lap-time strings.
//! - Name the columns a row exposes to filtering, sorting and editing.
//!
//! # Invariants
//! - `id` is assigned once by the store and never changes.
//! - `durations` keys match the store's attribute set exactly.

use crate::model::attribute::AttributeSet;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Store-assigned row identifier (auto-increment semantics).
pub type RecordId = i64;

/// One contact row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub job: String,
    pub email: String,
    /// Attribute key -> `m:ss` text. Blank until edited.
    pub durations: BTreeMap<String, String>,
}

impl Record {
    /// Returns the raw lap-time text for one attribute key.
    pub fn duration(&self, key: &str) -> Option<&str> {
        self.durations.get(key).map(String::as_str)
    }

    /// Returns the display text of one column.
    ///
    /// `None` only for attribute keys this record does not carry.
    pub fn field(&self, column: &Column) -> Option<Cow<'_, str>> {
        match column {
            Column::Id => Some(Cow::Owned(self.id.to_string())),
            Column::Name => Some(Cow::Borrowed(self.name.as_str())),
            Column::Job => Some(Cow::Borrowed(self.job.as_str())),
            Column::Email => Some(Cow::Borrowed(self.email.as_str())),
            Column::Attribute(key) => self.duration(key).map(Cow::Borrowed),
        }
    }
}

/// Field values for a row that has not been assigned an id yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRecord {
    pub name: String,
    pub job: String,
    pub email: String,
    pub durations: BTreeMap<String, String>,
}

impl NewRecord {
    /// Blank row, as created by the table's "Add" action.
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn new(name: impl Into<String>, job: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            job: job.into(),
            email: email.into(),
            durations: BTreeMap::new(),
        }
    }

    pub fn with_duration(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.durations.insert(key.into(), value.into());
        self
    }
}

/// A column of the contact table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Name,
    Job,
    Email,
    /// Lap-time column, by attribute key.
    Attribute(String),
}

impl Column {
    /// Every column in table order: fixed columns, then attributes.
    pub fn all(attributes: &AttributeSet) -> Vec<Column> {
        let mut columns = vec![Column::Id, Column::Name, Column::Job, Column::Email];
        columns.extend(attributes.keys().map(|key| Column::Attribute(key.to_string())));
        columns
    }

    /// Resolves a header label or field key, ASCII case-insensitively.
    pub fn resolve(name: &str, attributes: &AttributeSet) -> Option<Column> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("id") {
            return Some(Column::Id);
        }
        if name.eq_ignore_ascii_case("name") {
            return Some(Column::Name);
        }
        if name.eq_ignore_ascii_case("job") {
            return Some(Column::Job);
        }
        if name.eq_ignore_ascii_case("email") {
            return Some(Column::Email);
        }
        attributes
            .resolve(name)
            .map(|spec| Column::Attribute(spec.key.clone()))
    }

    /// Table header text.
    pub fn header<'a>(&'a self, attributes: &'a AttributeSet) -> &'a str {
        match self {
            Column::Id => "ID",
            Column::Name => "Name",
            Column::Job => "Job",
            Column::Email => "Email",
            Column::Attribute(key) => attributes
                .iter()
                .find(|spec| &spec.key == key)
                .map_or(key.as_str(), |spec| spec.label.as_str()),
        }
    }
}

/// Which columns a search pattern is matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    All,
    Column(Column),
}

impl ColumnSelector {
    /// Resolves `All` or any name accepted by [`Column::resolve`].
    pub fn resolve(name: &str, attributes: &AttributeSet) -> Option<ColumnSelector> {
        if name.trim().eq_ignore_ascii_case("all") {
            return Some(ColumnSelector::All);
        }
        Column::resolve(name, attributes).map(ColumnSelector::Column)
    }
}
