//! In-memory contact table with live notifications.
//!
//! # Responsibility
//! - Own every record of the board in display order.
//! - Allocate ids, apply add/update/delete and announce each mutation.
//! - Answer filter/sort queries for the table view.
//!
//! # Invariants
//! - Ids are unique and allocated monotonically; deleted ids are never reused.
//! - Insertion order is the default display order.
//! - Failed mutations leave the store unchanged and emit nothing.
//! - Each successful mutation emits exactly one `RowEvent` before returning.

use crate::duration::parse_duration;
use crate::model::attribute::AttributeSet;
use crate::model::record::{Column, ColumnSelector, NewRecord, Record, RecordId};
use crate::sync::bridge::{RowEvent, RowObserver, SubscriptionId, SyncBridge};
use log::{debug, info};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::Receiver;

pub type StoreResult<T> = Result<T, StoreError>;

/// Row store errors.
#[derive(Debug)]
pub enum StoreError {
    OutOfRange { position: usize, len: usize },
    NotFound(RecordId),
    DuplicateId(RecordId),
    UnknownColumn(String),
    UnknownAttribute(String),
    ImmutableColumn(Column),
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { position, len } => {
                write!(f, "row position {position} is out of range for {len} rows")
            }
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::DuplicateId(id) => write!(f, "record id {id} already exists"),
            Self::UnknownColumn(name) => write!(f, "unknown column `{name}`"),
            Self::UnknownAttribute(key) => write!(f, "unknown lap attribute `{key}`"),
            Self::ImmutableColumn(column) => write!(f, "column {column:?} cannot be edited"),
            Self::InvalidPattern { pattern, source } => {
                write!(f, "invalid search pattern `{pattern}`: {source}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Sort direction for [`ViewQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Column plus direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: Column,
    pub order: SortOrder,
}

/// Filter and sort options for a table view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    pub selector: ColumnSelector,
    /// Regular expression; empty matches every row.
    pub pattern: String,
    /// `None` keeps store order.
    pub sort: Option<SortKey>,
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            selector: ColumnSelector::All,
            pattern: String::new(),
            sort: None,
        }
    }
}

/// Ordered, id-keyed contact rows.
#[derive(Debug)]
pub struct RowStore {
    attributes: AttributeSet,
    records: Vec<Record>,
    next_id: RecordId,
    bridge: SyncBridge,
}

impl RowStore {
    /// Creates an empty store; the first id is `1`.
    pub fn new(attributes: AttributeSet) -> Self {
        Self {
            attributes,
            records: Vec::new(),
            next_id: 1,
            bridge: SyncBridge::new(),
        }
    }

    /// Builds a store from rows loaded elsewhere, keeping their ids and order.
    ///
    /// The next allocated id is the larger of `next_id` and `max(id) + 1`.
    /// No events are emitted for loaded rows.
    pub fn with_records(
        attributes: AttributeSet,
        records: Vec<Record>,
        next_id: RecordId,
    ) -> StoreResult<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut normalized = Vec::with_capacity(records.len());
        for mut record in records {
            if !seen.insert(record.id) {
                return Err(StoreError::DuplicateId(record.id));
            }
            record.durations = normalize_durations(&attributes, record.durations)?;
            normalized.push(record);
        }

        let after_max = normalized.iter().map(|record| record.id + 1).max().unwrap_or(1);
        Ok(Self {
            attributes,
            records: normalized,
            next_id: next_id.max(after_max),
            bridge: SyncBridge::new(),
        })
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Id that the next `add` will assign.
    pub fn next_id(&self) -> RecordId {
        self.next_id
    }

    /// All records in store order.
    pub fn all(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn position_of(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    /// Appends a new record with a fresh id and emits `Added`.
    ///
    /// Attributes missing from `fields` start blank.
    pub fn add(&mut self, fields: NewRecord) -> StoreResult<Record> {
        let durations = normalize_durations(&self.attributes, fields.durations)?;
        let record = Record {
            id: self.next_id,
            name: fields.name,
            job: fields.job,
            email: fields.email,
            durations,
        };
        self.next_id += 1;
        self.records.push(record.clone());

        info!(
            "event=row_add module=store status=ok id={} rows={}",
            record.id,
            self.records.len()
        );
        self.bridge.publish(&RowEvent::Added(record.clone()));
        Ok(record)
    }

    /// Removes the record at `position` in store order and emits `Deleted`.
    pub fn delete(&mut self, position: usize) -> StoreResult<RecordId> {
        let id = self
            .records
            .get(position)
            .map(|record| record.id)
            .ok_or(StoreError::OutOfRange {
                position,
                len: self.records.len(),
            })?;
        self.remove_at(position);
        Ok(id)
    }

    /// Removes the record shown at `position` of a filtered/sorted `view`.
    pub fn delete_in(&mut self, view: &[Record], position: usize) -> StoreResult<RecordId> {
        let id = view
            .get(position)
            .map(|record| record.id)
            .ok_or(StoreError::OutOfRange {
                position,
                len: view.len(),
            })?;
        self.delete_id(id)
    }

    /// Removes a record by id and emits `Deleted`.
    pub fn delete_id(&mut self, id: RecordId) -> StoreResult<RecordId> {
        let position = self.position_of(id).ok_or(StoreError::NotFound(id))?;
        self.remove_at(position);
        Ok(id)
    }

    /// Puts a previously removed record back at `position` (clamped to the
    /// end) and emits `Restored`. The id is kept.
    pub fn restore(&mut self, position: usize, record: Record) -> StoreResult<()> {
        if self.get(record.id).is_some() {
            return Err(StoreError::DuplicateId(record.id));
        }
        let mut record = record;
        record.durations = normalize_durations(&self.attributes, record.durations)?;
        let position = position.min(self.records.len());
        self.next_id = self.next_id.max(record.id + 1);
        self.records.insert(position, record.clone());

        info!(
            "event=row_restore module=store status=ok id={} position={}",
            record.id, position
        );
        self.bridge.publish(&RowEvent::Restored { position, record });
        Ok(())
    }

    /// Sets one editable column and emits `Updated`. Returns the new row.
    pub fn update_field(
        &mut self,
        id: RecordId,
        column: &Column,
        value: impl Into<String>,
    ) -> StoreResult<Record> {
        let position = self.position_of(id).ok_or(StoreError::NotFound(id))?;
        if let Column::Attribute(key) = column {
            if !self.attributes.contains_key(key) {
                return Err(StoreError::UnknownAttribute(key.clone()));
            }
        }

        let record = &mut self.records[position];
        let value = value.into();
        match column {
            Column::Id => return Err(StoreError::ImmutableColumn(Column::Id)),
            Column::Name => record.name = value,
            Column::Job => record.job = value,
            Column::Email => record.email = value,
            Column::Attribute(key) => {
                record.durations.insert(key.clone(), value);
            }
        }
        let updated = record.clone();

        debug!(
            "event=row_update module=store status=ok id={} column={:?}",
            id, column
        );
        self.bridge.publish(&RowEvent::Updated(updated.clone()));
        Ok(updated)
    }

    /// Resolves a column selector by header label or key (`All` included).
    pub fn resolve_selector(&self, name: &str) -> StoreResult<ColumnSelector> {
        ColumnSelector::resolve(name, &self.attributes)
            .ok_or_else(|| StoreError::UnknownColumn(name.to_string()))
    }

    /// Resolves one column by header label or key.
    pub fn resolve_column(&self, name: &str) -> StoreResult<Column> {
        Column::resolve(name, &self.attributes)
            .ok_or_else(|| StoreError::UnknownColumn(name.to_string()))
    }

    /// Records whose selected column(s) match `pattern`, in store order.
    ///
    /// `selector` is `All` or a column label/key.
    pub fn filter(&self, selector: &str, pattern: &str) -> StoreResult<Vec<Record>> {
        let selector = self.resolve_selector(selector)?;
        self.view(&ViewQuery {
            selector,
            pattern: pattern.to_string(),
            sort: None,
        })
    }

    /// Filtered and optionally sorted copy of the table.
    pub fn view(&self, query: &ViewQuery) -> StoreResult<Vec<Record>> {
        let matcher = compile_pattern(&query.pattern)?;
        let columns = match &query.selector {
            ColumnSelector::All => Column::all(&self.attributes),
            ColumnSelector::Column(column) => vec![column.clone()],
        };

        let mut rows = self
            .records
            .iter()
            .filter(|record| match &matcher {
                None => true,
                Some(regex) => columns.iter().any(|column| {
                    record
                        .field(column)
                        .is_some_and(|text| regex.is_match(&text))
                }),
            })
            .cloned()
            .collect::<Vec<_>>();

        if let Some(sort) = &query.sort {
            rows.sort_by(|left, right| {
                let ordering = compare_by_column(left, right, &sort.column);
                match sort.order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

        Ok(rows)
    }

    /// Registers an observer for row events.
    pub fn subscribe(&mut self, observer: Box<dyn RowObserver>) -> SubscriptionId {
        self.bridge.subscribe(observer)
    }

    /// Registers a closure for row events.
    pub fn subscribe_fn(&mut self, callback: impl FnMut(&RowEvent) + 'static) -> SubscriptionId {
        self.bridge.subscribe_fn(callback)
    }

    /// Registers a queue for row events.
    pub fn subscribe_channel(&mut self) -> (SubscriptionId, Receiver<RowEvent>) {
        self.bridge.subscribe_channel()
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bridge.unsubscribe(id)
    }

    fn remove_at(&mut self, position: usize) {
        let removed = self.records.remove(position);
        info!(
            "event=row_delete module=store status=ok id={} rows={}",
            removed.id,
            self.records.len()
        );
        self.bridge.publish(&RowEvent::Deleted(removed.id));
    }
}

fn normalize_durations(
    attributes: &AttributeSet,
    mut durations: BTreeMap<String, String>,
) -> StoreResult<BTreeMap<String, String>> {
    if let Some(unknown) = durations.keys().find(|key| !attributes.contains_key(key)) {
        return Err(StoreError::UnknownAttribute(unknown.clone()));
    }
    for key in attributes.keys() {
        durations.entry(key.to_string()).or_default();
    }
    Ok(durations)
}

fn compile_pattern(pattern: &str) -> StoreResult<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(pattern)
        .map(Some)
        .map_err(|source| StoreError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn compare_by_column(left: &Record, right: &Record, column: &Column) -> Ordering {
    match column {
        Column::Id => left.id.cmp(&right.id),
        Column::Name => left.name.cmp(&right.name),
        Column::Job => left.job.cmp(&right.job),
        Column::Email => left.email.cmp(&right.email),
        // Unparsable (blank) lap times sort before every real time.
        Column::Attribute(key) => {
            let seconds = |record: &Record| {
                record
                    .duration(key)
                    .and_then(|text| parse_duration(text).ok())
            };
            seconds(left).cmp(&seconds(right))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_durations, RowStore, StoreError};
    use crate::model::attribute::AttributeSet;
    use crate::model::record::NewRecord;
    use std::collections::BTreeMap;

    #[test]
    fn normalize_fills_missing_and_rejects_unknown_keys() {
        let attributes = AttributeSet::lap_stages();
        let mut durations = BTreeMap::new();
        durations.insert("city_escape".to_string(), "2:51".to_string());

        let normalized = normalize_durations(&attributes, durations).unwrap();
        assert_eq!(normalized.len(), 3);
        assert_eq!(normalized["city_escape"], "2:51");
        assert_eq!(normalized["prison_lane"], "");

        let mut unknown = BTreeMap::new();
        unknown.insert("green_hill".to_string(), "1:00".to_string());
        assert!(matches!(
            normalize_durations(&attributes, unknown),
            Err(StoreError::UnknownAttribute(key)) if key == "green_hill"
        ));
    }

    #[test]
    fn add_with_unknown_attribute_leaves_ids_untouched() {
        let mut store = RowStore::new(AttributeSet::lap_stages());
        let err = store
            .add(NewRecord::blank().with_duration("green_hill", "1:00"))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownAttribute(_)));
        assert_eq!(store.next_id(), 1);
        assert!(store.is_empty());
    }
}
