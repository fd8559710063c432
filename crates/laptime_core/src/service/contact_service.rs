//! Contact board use-case service.
//!
//! # Responsibility
//! - Load the row store from the repository through a borrowed connection.
//! - Apply table edits to the store and persist them.
//! - Serve table views and chart projections.
//!
//! # Invariants
//! - The store is mutated first so ids come from the store; a failed write
//!   is rolled back in the store (observers see the compensating event).
//! - Service APIs never bypass repository persistence.

use crate::chart::model::ChartModel;
use crate::chart::projector::{project, ProjectionError};
use crate::model::attribute::AttributeSet;
use crate::model::record::{Column, NewRecord, Record, RecordId};
use crate::model::series::Series;
use crate::repo::contact_repo::{ContactRepository, RepoError};
use crate::seed::sample_contacts;
use crate::store::row_store::{RowStore, StoreError, ViewQuery};
use crate::sync::bridge::{RowEvent, RowObserver, SubscriptionId};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::Receiver;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level error wrapping the failing layer.
#[derive(Debug)]
pub enum ServiceError {
    Store(StoreError),
    Repo(RepoError),
    Projection(ProjectionError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Projection(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Projection(err) => Some(err),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ProjectionError> for ServiceError {
    fn from(value: ProjectionError) -> Self {
        Self::Projection(value)
    }
}

/// Persistent contact board: row store plus repository.
pub struct ContactService<R: ContactRepository> {
    repo: R,
    store: RowStore,
}

impl<R: ContactRepository> ContactService<R> {
    /// Loads every persisted contact into a fresh store.
    pub fn load(repo: R, attributes: AttributeSet) -> ServiceResult<Self> {
        let records = repo.list_contacts(&attributes)?;
        let next_id = repo.next_contact_id()?;
        let store = RowStore::with_records(attributes, records, next_id)?;
        info!(
            "event=board_load module=service status=ok rows={} next_id={}",
            store.len(),
            store.next_id()
        );
        Ok(Self { repo, store })
    }

    pub fn store(&self) -> &RowStore {
        &self.store
    }

    pub fn records(&self) -> &[Record] {
        self.store.all()
    }

    /// Adds a row and persists it.
    pub fn add(&mut self, fields: NewRecord) -> ServiceResult<Record> {
        let record = self.store.add(fields)?;
        if let Err(err) = self.repo.insert_contact(&record) {
            self.rollback("add", record.id, |store| store.delete_id(record.id).map(|_| ()));
            return Err(err.into());
        }
        Ok(record)
    }

    /// Adds the demo contacts. Returns the created rows.
    pub fn seed_samples(&mut self) -> ServiceResult<Vec<Record>> {
        sample_contacts(self.store.attributes())
            .into_iter()
            .map(|fields| self.add(fields))
            .collect()
    }

    /// Deletes the row at `position` in store order.
    pub fn delete_at(&mut self, position: usize) -> ServiceResult<RecordId> {
        let id = self
            .store
            .all()
            .get(position)
            .map(|record| record.id)
            .ok_or(StoreError::OutOfRange {
                position,
                len: self.store.len(),
            })?;
        self.delete_id(id)
    }

    /// Deletes the row shown at `position` of a filtered/sorted `view`.
    pub fn delete_in(&mut self, view: &[Record], position: usize) -> ServiceResult<RecordId> {
        let id = view
            .get(position)
            .map(|record| record.id)
            .ok_or(StoreError::OutOfRange {
                position,
                len: view.len(),
            })?;
        self.delete_id(id)
    }

    /// Deletes a row by id.
    pub fn delete_id(&mut self, id: RecordId) -> ServiceResult<RecordId> {
        let position = self.store.position_of(id).ok_or(StoreError::NotFound(id))?;
        let removed = self.store.all()[position].clone();
        self.store.delete_id(id)?;
        if let Err(err) = self.repo.delete_contact(id) {
            self.rollback("delete", id, |store| store.restore(position, removed));
            return Err(err.into());
        }
        Ok(id)
    }

    /// Edits one column of one row and persists it.
    pub fn update_field(
        &mut self,
        id: RecordId,
        column: &Column,
        value: impl Into<String>,
    ) -> ServiceResult<Record> {
        let previous = self
            .store
            .get(id)
            .and_then(|record| record.field(column))
            .map(|text| text.into_owned());
        let updated = self.store.update_field(id, column, value)?;
        if let Err(err) = self.repo.update_contact(&updated) {
            let previous = previous.unwrap_or_default();
            self.rollback("update", id, |store| {
                store.update_field(id, column, previous).map(|_| ())
            });
            return Err(err.into());
        }
        Ok(updated)
    }

    /// See [`RowStore::filter`].
    pub fn filter(&self, selector: &str, pattern: &str) -> ServiceResult<Vec<Record>> {
        Ok(self.store.filter(selector, pattern)?)
    }

    /// See [`RowStore::view`].
    pub fn view(&self, query: &ViewQuery) -> ServiceResult<Vec<Record>> {
        Ok(self.store.view(query)?)
    }

    /// Projects every row, failing on the first malformed lap time.
    pub fn project(&self) -> ServiceResult<Vec<Series>> {
        Ok(project(self.store.all(), self.store.attributes())?)
    }

    /// Builds a chart model from the current rows.
    pub fn chart_model(&self, title: impl Into<String>) -> ServiceResult<ChartModel> {
        Ok(ChartModel::from_records(
            title,
            self.store.attributes().clone(),
            self.store.all(),
        )?)
    }

    pub fn subscribe(&mut self, observer: Box<dyn RowObserver>) -> SubscriptionId {
        self.store.subscribe(observer)
    }

    pub fn subscribe_fn(&mut self, callback: impl FnMut(&RowEvent) + 'static) -> SubscriptionId {
        self.store.subscribe_fn(callback)
    }

    pub fn subscribe_channel(&mut self) -> (SubscriptionId, Receiver<RowEvent>) {
        self.store.subscribe_channel()
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    fn rollback(
        &mut self,
        action: &str,
        id: RecordId,
        undo: impl FnOnce(&mut RowStore) -> Result<(), StoreError>,
    ) {
        error!(
            "event=board_{} module=service status=error id={} error_code=persist_failed",
            action, id
        );
        if let Err(err) = undo(&mut self.store) {
            error!(
                "event=board_rollback module=service status=error id={} error={}",
                id, err
            );
        }
    }
}
